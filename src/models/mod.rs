pub mod vocabulary;

use std::fmt;

/// Fuel type code. `NotAvailable` stands in for listings without the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FuelType {
    Petrol,
    Diesel,
    Electric,
    HybridPetrol,
    HybridDiesel,
    NotAvailable,
}

impl FuelType {
    pub fn code(&self) -> &'static str {
        match self {
            FuelType::Petrol => "petrol",
            FuelType::Diesel => "diesel",
            FuelType::Electric => "electric",
            FuelType::HybridPetrol => "hybrid_petrol",
            FuelType::HybridDiesel => "hybrid_diesel",
            FuelType::NotAvailable => "not_available",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gearbox {
    Manual,
    Automatic,
    NotAvailable,
}

impl Gearbox {
    pub fn code(&self) -> &'static str {
        match self {
            Gearbox::Manual => "manual",
            Gearbox::Automatic => "automatic",
            Gearbox::NotAvailable => "not_available",
        }
    }
}

/// Price rating badge assigned by the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PriceClass {
    #[default]
    Unclassified = 0,
    BelowAverage = 1,
    WithinAverage = 2,
    AboveAverage = 3,
}

impl PriceClass {
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

/// Engine displacement and power, always parsed together from the subtitle line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSpec {
    pub displacement_cc: u32,
    pub horsepower: u32,
}

/// One scraped car ad
#[derive(Debug, Clone, PartialEq)]
pub struct ListingRecord {
    pub brand: String,
    pub title: String,
    pub engine: Option<EngineSpec>,
    /// `1` when the listing does not show a mileage
    pub mileage_km: u64,
    pub fuel_type: FuelType,
    pub gearbox: Gearbox,
    /// `None` when the listing does not show a registration year
    pub year: Option<u32>,
    pub price: u64,
    /// Only present in the rich layout
    pub ad_link: Option<String>,
    pub price_class: PriceClass,
}

impl fmt::Display for ListingRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?} ({} EUR, {} km)", self.brand, self.title, self.price, self.mileage_km)
    }
}
