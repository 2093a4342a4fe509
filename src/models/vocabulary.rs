//! Translation of the site's Portuguese labels into normalized codes.
//!
//! The tables are expected to cover everything the site shows. A label that
//! is not listed fails the listing so the gap gets noticed.

use super::{FuelType, Gearbox, PriceClass};
use crate::error::ExtractionError;

/// Marker used in place of a label when the listing omits the field.
pub const NOT_AVAILABLE: &str = "N/A";

/// A closed set of codes with a fixed label table.
pub trait Vocabulary: Sized + Copy + 'static {
    /// Field name reported in errors
    const FIELD: &'static str;

    fn table() -> &'static [(&'static str, Self)];
}

impl Vocabulary for FuelType {
    const FIELD: &'static str = "fuel_type";

    fn table() -> &'static [(&'static str, Self)] {
        &[
            ("Gasolina", FuelType::Petrol),
            ("Diesel", FuelType::Diesel),
            ("Eléctrico", FuelType::Electric),
            ("Híbrido (Gasolina)", FuelType::HybridPetrol),
            ("Híbrido (Diesel)", FuelType::HybridDiesel),
            (NOT_AVAILABLE, FuelType::NotAvailable),
        ]
    }
}

impl Vocabulary for Gearbox {
    const FIELD: &'static str = "gearbox";

    fn table() -> &'static [(&'static str, Self)] {
        &[
            ("Manual", Gearbox::Manual),
            ("Automática", Gearbox::Automatic),
            (NOT_AVAILABLE, Gearbox::NotAvailable),
        ]
    }
}

impl Vocabulary for PriceClass {
    const FIELD: &'static str = "price_class";

    fn table() -> &'static [(&'static str, Self)] {
        &[
            ("Abaixo da média", PriceClass::BelowAverage),
            ("Dentro da média", PriceClass::WithinAverage),
            ("Acima da média", PriceClass::AboveAverage),
        ]
    }
}

/// Look up `label` (surrounding whitespace ignored) in the table for `T`.
pub fn translate<T: Vocabulary>(label: &str) -> Result<T, ExtractionError> {
    let label = label.trim();
    T::table()
        .iter()
        .find(|(known, _)| *known == label)
        .map(|(_, code)| *code)
        .ok_or_else(|| ExtractionError::UnknownLabel {
            field: T::FIELD,
            label: label.to_string(),
        })
}
