use super::filter::FilteredView;

/// A plain rectangular table of display text, used by the table widgets and
/// CSV export.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableData {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableData {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        TableData {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Two-column table from `(key, value)` pairs.
    pub fn from_pairs<V, F>(columns: [&str; 2], pairs: &[(String, V)], fmt_value: F) -> Self
    where
        F: Fn(&V) -> String,
    {
        let mut table = TableData::new(columns);
        table.rows = pairs
            .iter()
            .map(|(k, v)| vec![k.clone(), fmt_value(v)])
            .collect();
        table
    }

    /// Every column of every row in the view.
    pub fn from_view(view: &FilteredView<'_>) -> Self {
        let mut table = TableData::new(view.dataset().column_names());
        table.rows = view
            .rows()
            .map(|listing| table.columns.iter().map(|c| listing.cell_text(c)).collect())
            .collect();
        table
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{apply_filter, FilterSpec};
    use crate::data::model::tests::three_rows;
    use crate::data::model::Facet;

    #[test]
    fn view_table_has_schema_columns_and_filtered_rows() {
        let ds = three_rows();
        let spec = FilterSpec::full(&ds).with_selection(Facet::Country, ["FR"]);
        let table = TableData::from_view(&apply_filter(&ds, &spec));

        assert_eq!(table.columns[0], "Name");
        assert_eq!(table.len(), 1);
        let price_col = table.columns.iter().position(|c| c == "Price").unwrap();
        assert_eq!(table.rows[0][price_col], "150");
    }

    #[test]
    fn pairs_are_formatted() {
        let pairs = vec![("ES".to_string(), 12.346)];
        let table = TableData::from_pairs(["country", "mean_price"], &pairs, |v| format!("{v:.2}"));
        assert_eq!(table.rows, [["ES", "12.35"]]);
    }
}
