//! Flattened CSV export of an exposure table.
//!
//! One row per strike, all numeric fields, columns in `EXPORT_COLUMNS` order.
//! Downstream tooling matches on these names, so they must not change.

use std::io::Write;

use polars::prelude::*;
use thiserror::Error;

use super::row::StrikeExposureRow;
use super::table::ExposureTable;

/// Export columns, in order.
pub const EXPORT_COLUMNS: &[&str] = &[
    "Strike",
    "Call_OI",
    "Put_OI",
    "Call_OI_Change",
    "Put_OI_Change",
    "Call_Volume",
    "Put_Volume",
    "Total_Volume",
    "Call_IV",
    "Put_IV",
    "Call_LTP",
    "Put_LTP",
    "Call_Delta",
    "Put_Delta",
    "Call_Gamma",
    "Put_Gamma",
    "Call_Vanna",
    "Put_Vanna",
    "Call_Charm",
    "Put_Charm",
    "Call_GEX",
    "Put_GEX",
    "Net_GEX",
    "Call_DEX",
    "Put_DEX",
    "Net_DEX",
    "Call_Vanna_Exp",
    "Put_Vanna_Exp",
    "Net_Vanna",
    "Call_Charm_Exp",
    "Put_Charm_Exp",
    "Net_Charm",
    "Call_Flow_GEX",
    "Put_Flow_GEX",
    "Net_Flow_GEX",
    "Call_Flow_DEX",
    "Put_Flow_DEX",
    "Net_Flow_DEX",
    "Hedging_Pressure",
];

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn int_column(name: &str, rows: &[StrikeExposureRow], f: impl Fn(&StrikeExposureRow) -> i64) -> Column {
    Column::new(name.into(), rows.iter().map(f).collect::<Vec<i64>>())
}

fn float_column(name: &str, rows: &[StrikeExposureRow], f: impl Fn(&StrikeExposureRow) -> f64) -> Column {
    Column::new(name.into(), rows.iter().map(f).collect::<Vec<f64>>())
}

impl ExposureTable {
    /// The table as a polars `DataFrame` with `EXPORT_COLUMNS`.
    pub fn to_dataframe(&self) -> Result<DataFrame, ExportError> {
        let rows = self.rows();
        let columns = vec![
            float_column("Strike", rows, |r| r.strike),
            int_column("Call_OI", rows, |r| r.call_oi),
            int_column("Put_OI", rows, |r| r.put_oi),
            int_column("Call_OI_Change", rows, |r| r.call_oi_change),
            int_column("Put_OI_Change", rows, |r| r.put_oi_change),
            int_column("Call_Volume", rows, |r| r.call_volume),
            int_column("Put_Volume", rows, |r| r.put_volume),
            int_column("Total_Volume", rows, |r| r.total_volume),
            float_column("Call_IV", rows, |r| r.call_iv),
            float_column("Put_IV", rows, |r| r.put_iv),
            float_column("Call_LTP", rows, |r| r.call_ltp),
            float_column("Put_LTP", rows, |r| r.put_ltp),
            float_column("Call_Delta", rows, |r| r.call_delta),
            float_column("Put_Delta", rows, |r| r.put_delta),
            float_column("Call_Gamma", rows, |r| r.call_gamma),
            float_column("Put_Gamma", rows, |r| r.put_gamma),
            float_column("Call_Vanna", rows, |r| r.call_vanna),
            float_column("Put_Vanna", rows, |r| r.put_vanna),
            float_column("Call_Charm", rows, |r| r.call_charm),
            float_column("Put_Charm", rows, |r| r.put_charm),
            float_column("Call_GEX", rows, |r| r.call_gex),
            float_column("Put_GEX", rows, |r| r.put_gex),
            float_column("Net_GEX", rows, |r| r.net_gex),
            float_column("Call_DEX", rows, |r| r.call_dex),
            float_column("Put_DEX", rows, |r| r.put_dex),
            float_column("Net_DEX", rows, |r| r.net_dex),
            float_column("Call_Vanna_Exp", rows, |r| r.call_vanna_exp),
            float_column("Put_Vanna_Exp", rows, |r| r.put_vanna_exp),
            float_column("Net_Vanna", rows, |r| r.net_vanna),
            float_column("Call_Charm_Exp", rows, |r| r.call_charm_exp),
            float_column("Put_Charm_Exp", rows, |r| r.put_charm_exp),
            float_column("Net_Charm", rows, |r| r.net_charm),
            float_column("Call_Flow_GEX", rows, |r| r.call_flow_gex),
            float_column("Put_Flow_GEX", rows, |r| r.put_flow_gex),
            float_column("Net_Flow_GEX", rows, |r| r.net_flow_gex),
            float_column("Call_Flow_DEX", rows, |r| r.call_flow_dex),
            float_column("Put_Flow_DEX", rows, |r| r.put_flow_dex),
            float_column("Net_Flow_DEX", rows, |r| r.net_flow_dex),
            float_column("Hedging_Pressure", rows, |r| r.hedging_pressure),
        ];

        Ok(DataFrame::new(columns)?)
    }

    /// Write the table as CSV with a header row.
    pub fn write_csv<W: Write>(&self, writer: &mut W) -> Result<(), ExportError> {
        let mut df = self.to_dataframe()?;
        CsvWriter::new(writer).include_header(true).finish(&mut df)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exposure::table::ChainSnapshot;

    fn table() -> ExposureTable {
        let rows = vec![
            StrikeExposureRow {
                strike: 105.0,
                call_oi: 300,
                net_gex: -1.0,
                ..Default::default()
            },
            StrikeExposureRow {
                strike: 100.0,
                call_oi: 100,
                net_gex: 2.0,
                ..Default::default()
            },
        ];
        ExposureTable::new(ChainSnapshot::default(), rows)
    }

    #[test]
    fn test_dataframe_columns_in_order() {
        let df = table().to_dataframe().unwrap();
        let names: Vec<String> = df.get_column_names().iter().map(|n| n.to_string()).collect();

        assert_eq!(names, EXPORT_COLUMNS.iter().map(|c| c.to_string()).collect::<Vec<_>>());
        assert_eq!(df.height(), 2);
    }

    #[test]
    fn test_csv_header_and_rows() {
        let mut buffer = Vec::new();
        table().write_csv(&mut buffer).unwrap();
        let csv = String::from_utf8(buffer).unwrap();
        let mut lines = csv.lines();

        assert_eq!(lines.next().unwrap(), EXPORT_COLUMNS.join(","));
        for (line, strike, call_oi) in [(lines.next(), 100.0, "100"), (lines.next(), 105.0, "300")] {
            let fields: Vec<&str> = line.unwrap().split(',').collect();
            assert_eq!(fields.len(), EXPORT_COLUMNS.len());
            assert_eq!(fields[0].parse::<f64>().unwrap(), strike);
            assert_eq!(fields[1], call_oi);
        }
        assert!(lines.next().is_none());
    }
}
