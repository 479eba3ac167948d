pub mod icons;
pub mod output;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{
    dim, error, evidence_badge, free_badge, header, info, locked, muted, risk_badge, section, success,
    summary_row, warn,
};
pub use table::{medication_table, stats_table, MedicationRow, TableBuilder};
pub use theme::{theme, Theme};
