//! Tablas del almacén
//!
//! Cada entidad se persiste como un único fichero JSON (array de objetos).

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Customers,
    Destinations,
    Bookings,
    Schedules,
    Payments,
    Vehicles,
    Staff,
    Feedback,
}

impl Table {
    pub const ALL: [Table; 8] = [
        Table::Customers,
        Table::Destinations,
        Table::Bookings,
        Table::Schedules,
        Table::Payments,
        Table::Vehicles,
        Table::Staff,
        Table::Feedback,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Customers => "customers",
            Table::Destinations => "destinations",
            Table::Bookings => "bookings",
            Table::Schedules => "schedules",
            Table::Payments => "payments",
            Table::Vehicles => "vehicles",
            Table::Staff => "staff",
            Table::Feedback => "feedback",
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.json", self.as_str())
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
