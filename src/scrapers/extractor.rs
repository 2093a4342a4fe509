//! Turns one listing container into a [`ListingRecord`].
//!
//! Every field is first read on its own, falling back to its default when
//! the markup lacks it. Validation and translation run afterwards in a
//! single pass, so one bad field fails the listing and nothing else.

use crate::config::Layout;
use crate::error::ExtractionError;
use crate::models::vocabulary::{translate, NOT_AVAILABLE};
use crate::models::{EngineSpec, ListingRecord, PriceClass};
use crate::scrapers::selectors::{Field, Role};
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

/// Mileage written for listings that do not show one
pub const MILEAGE_SENTINEL: &str = "1";

fn engine_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?P<cylinder>\d{1,3}\s?\d{3})\s*cm3\s*•\s*(?P<horsepower>\d+)\s*cv")
            .expect("engine pattern is valid")
    })
}

/// Field values as found in the markup, defaults already applied.
#[derive(Debug, Default, Clone, PartialEq)]
struct RawListing {
    title: String,
    engine: Option<(String, String)>,
    mileage: String,
    fuel_type: String,
    gearbox: String,
    year: String,
    price: Option<String>,
    ad_link: Option<String>,
    rating: Option<Rating>,
}

#[derive(Debug, Clone, PartialEq)]
enum Rating {
    Label(String),
    /// Icon present but no label next to it
    Unlabelled,
}

#[derive(Debug, Clone)]
pub struct Extractor {
    layout: Layout,
}

impl Extractor {
    pub fn new(layout: Layout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Extract the record for one listing found under `category`.
    pub fn extract(&self, category: &str, listing: &Field<'_>) -> Result<ListingRecord, ExtractionError> {
        let raw = self.read(listing);
        self.validate(category, raw)
    }

    fn read(&self, listing: &Field<'_>) -> RawListing {
        let title = match listing.find(Role::Title).and_then(|t| t.first_text()) {
            Some(title) => title,
            None => {
                debug!("Listing has no title, keeping it with an empty one");
                String::new()
            }
        };

        let engine = listing
            .find(Role::Subtitle)
            .map(|line| line.text())
            .and_then(|line| parse_engine(&line));

        let mileage = listing
            .find(Role::Mileage)
            .map(|m| m.text().replace("km", ""))
            .unwrap_or_else(|| MILEAGE_SENTINEL.to_string());

        let labelled = |role: Role| {
            listing
                .find(role)
                .map(|f| f.text())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string())
        };

        let mut raw = RawListing {
            title,
            engine,
            mileage,
            fuel_type: labelled(Role::FuelType),
            gearbox: labelled(Role::Gearbox),
            year: labelled(Role::Year),
            ..RawListing::default()
        };

        let block = listing.find(Role::PriceBlock);
        match self.layout {
            Layout::Simple => {
                raw.price = block.map(|b| b.text());
            }
            Layout::Rich => {
                if let Some(block) = block {
                    raw.ad_link = block
                        .find(Role::PriceLink)
                        .and_then(|a| a.attr("href"))
                        .map(str::to_string);
                    raw.price = block.find(Role::PriceAmount).map(|h| h.text());
                    if block.find(Role::RatingIcon).is_some() {
                        raw.rating = Some(match block.find(Role::RatingLabel) {
                            Some(label) => Rating::Label(label.text()),
                            None => Rating::Unlabelled,
                        });
                    }
                }
            }
        }

        raw
    }

    fn validate(&self, category: &str, raw: RawListing) -> Result<ListingRecord, ExtractionError> {
        let engine = match raw.engine {
            Some((cylinder, horsepower)) => Some(EngineSpec {
                displacement_cc: to_u32("cilinder", &strip_spaces(&cylinder))?,
                horsepower: to_u32("hp", &horsepower)?,
            }),
            None => None,
        };

        let mileage_km = digits("kilometer", &strip_spaces(&raw.mileage))?;

        let year = if raw.year.trim() == NOT_AVAILABLE {
            None
        } else {
            Some(to_u32("year", &strip_spaces(&raw.year))?)
        };

        let price = match raw.price {
            Some(text) => digits("price", &normalize_price(&text))?,
            None => return Err(ExtractionError::MissingField { field: "price" }),
        };

        let ad_link = match (self.layout, raw.ad_link) {
            (Layout::Rich, None) => return Err(ExtractionError::MissingField { field: "ad_link" }),
            (_, link) => link,
        };

        let price_class = match raw.rating {
            None => PriceClass::Unclassified,
            Some(Rating::Label(label)) => translate(&label)?,
            Some(Rating::Unlabelled) => {
                return Err(ExtractionError::MissingField { field: "price_class" })
            }
        };

        Ok(ListingRecord {
            brand: category.to_string(),
            title: raw.title,
            engine,
            mileage_km,
            fuel_type: translate(&raw.fuel_type)?,
            gearbox: translate(&raw.gearbox)?,
            year,
            price,
            ad_link,
            price_class,
        })
    }
}

/// Displacement and horsepower groups of a "1 598 cm3 • 120 cv" line.
fn parse_engine(line: &str) -> Option<(String, String)> {
    let caps = engine_pattern().captures(line)?;
    Some((caps["cylinder"].to_string(), caps["horsepower"].to_string()))
}

fn strip_spaces(value: &str) -> String {
    value.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Drops the currency and any decimal part: "12 500,90 €" becomes "12500".
fn normalize_price(text: &str) -> String {
    let stripped = strip_spaces(&text.replace("EUR", "").replace('€', ""));
    match stripped.split_once(',') {
        Some((whole, _)) => whole.to_string(),
        None => stripped,
    }
}

fn digits(field: &'static str, value: &str) -> Result<u64, ExtractionError> {
    let not_numeric = || ExtractionError::NotNumeric {
        field,
        value: value.to_string(),
    };
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(not_numeric());
    }
    value.parse().map_err(|_| not_numeric())
}

fn to_u32(field: &'static str, value: &str) -> Result<u32, ExtractionError> {
    let n = digits(field, value)?;
    u32::try_from(n).map_err(|_| ExtractionError::NotNumeric {
        field,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FuelType, Gearbox};
    use crate::scrapers::selectors::SelectorTable;
    use scraper::Html;

    fn listing_html(fields: &str, price_block: &str) -> String {
        format!(
            r#"<section class="ooa-qat6iw">
                 <div class="ooa-1qo9a0p">
                   <h1><a href="/anuncio/1">Peugeot 208 1.2 PureTech</a></h1>
                   <p>123 456 cm3 • 90 cv</p>
                 </div>
                 <div class="ooa-d3dp2q"><dl>{fields}</dl></div>
                 {price_block}
               </section>"#
        )
    }

    const FIELDS: &str = r#"
        <dd data-parameter="mileage">50 000 km</dd>
        <dd data-parameter="fuel_type">Gasolina</dd>
        <dd data-parameter="gearbox">Manual</dd>
        <dd data-parameter="first_registration_year">2 019</dd>"#;

    fn extract(layout: Layout, html: &str) -> Result<ListingRecord, ExtractionError> {
        let table = SelectorTable::with_defaults().unwrap();
        let document = Html::parse_document(html);
        let root = Field::new(document.root_element(), &table);
        let listing = root.find(Role::Listing).unwrap();
        Extractor::new(layout).extract("Peugeot", &listing)
    }

    #[test]
    fn simple_layout_example() {
        let html = listing_html(FIELDS, r#"<div class="ooa-2p9dfw">12 500 EUR</div>"#);
        let record = extract(Layout::Simple, &html).unwrap();

        assert_eq!(record.brand, "Peugeot");
        assert_eq!(record.title, "Peugeot 208 1.2 PureTech");
        assert_eq!(
            record.engine,
            Some(EngineSpec {
                displacement_cc: 123456,
                horsepower: 90
            })
        );
        assert_eq!(record.mileage_km, 50000);
        assert_eq!(record.fuel_type, FuelType::Petrol);
        assert_eq!(record.gearbox, Gearbox::Manual);
        assert_eq!(record.year, Some(2019));
        assert_eq!(record.price, 12500);
        assert_eq!(record.ad_link, None);
        assert_eq!(record.price_class, PriceClass::Unclassified);
    }

    #[test]
    fn rich_layout_reads_link_and_rating() {
        let block = r#"<div class="ooa-2p9dfw">
            <a href="https://www.standvirtual.com/carros/anuncio/x-ID8P.html">ver</a>
            <h3>12 500,90 €</h3>
            <svg></svg><p>Abaixo da média</p>
        </div>"#;
        let record = extract(Layout::Rich, &listing_html(FIELDS, block)).unwrap();
        assert_eq!(
            record.ad_link.as_deref(),
            Some("https://www.standvirtual.com/carros/anuncio/x-ID8P.html")
        );
        assert_eq!(record.price, 12500);
        assert_eq!(record.price_class, PriceClass::BelowAverage);
    }

    #[test]
    fn rich_layout_without_icon_is_unclassified() {
        let block = r#"<div class="ooa-2p9dfw"><a href="/a">x</a><h3>9 990 EUR</h3><p>Acima da média</p></div>"#;
        let record = extract(Layout::Rich, &listing_html(FIELDS, block)).unwrap();
        assert_eq!(record.price_class, PriceClass::Unclassified);
    }

    #[test]
    fn rich_layout_requires_link() {
        let block = r#"<div class="ooa-2p9dfw"><h3>9 990 EUR</h3></div>"#;
        let err = extract(Layout::Rich, &listing_html(FIELDS, block)).unwrap_err();
        assert_eq!(err, ExtractionError::MissingField { field: "ad_link" });
    }

    #[test]
    fn missing_fields_fall_back_to_sentinels() {
        let html = listing_html("", r#"<div class="ooa-2p9dfw">1 000 EUR</div>"#);
        let record = extract(Layout::Simple, &html).unwrap();
        assert_eq!(record.mileage_km, 1);
        assert_eq!(record.fuel_type, FuelType::NotAvailable);
        assert_eq!(record.gearbox, Gearbox::NotAvailable);
        assert_eq!(record.year, None);
    }

    #[test]
    fn missing_title_keeps_listing() {
        let html = r#"<section class="ooa-qat6iw">
            <div class="ooa-2p9dfw">3 000 EUR</div></section>"#;
        let record = extract(Layout::Simple, html).unwrap();
        assert_eq!(record.title, "");
        assert_eq!(record.engine, None);
    }

    #[test]
    fn non_numeric_mileage_fails_listing() {
        let fields = r#"<dd data-parameter="mileage">muitos km</dd>"#;
        let html = listing_html(fields, r#"<div class="ooa-2p9dfw">1 000 EUR</div>"#);
        let err = extract(Layout::Simple, &html).unwrap_err();
        assert_eq!(
            err,
            ExtractionError::NotNumeric {
                field: "kilometer",
                value: "muitos".to_string()
            }
        );
    }

    #[test]
    fn unknown_fuel_label_fails_listing() {
        let fields = r#"<dd data-parameter="fuel_type">GPL</dd>"#;
        let html = listing_html(fields, r#"<div class="ooa-2p9dfw">1 000 EUR</div>"#);
        let err = extract(Layout::Simple, &html).unwrap_err();
        assert!(err.is_unknown_label());
    }

    #[test]
    fn non_numeric_year_fails_listing() {
        let fields = r#"<dd data-parameter="first_registration_year">2019a</dd>"#;
        let html = listing_html(fields, r#"<div class="ooa-2p9dfw">1 000 EUR</div>"#);
        let err = extract(Layout::Simple, &html).unwrap_err();
        assert_eq!(
            err,
            ExtractionError::NotNumeric {
                field: "year",
                value: "2019a".to_string()
            }
        );
    }

    #[test]
    fn non_numeric_price_fails_listing() {
        let html = listing_html(FIELDS, r#"<div class="ooa-2p9dfw">Sob consulta</div>"#);
        let err = extract(Layout::Simple, &html).unwrap_err();
        assert_eq!(
            err,
            ExtractionError::NotNumeric {
                field: "price",
                value: "Sobconsulta".to_string()
            }
        );
    }

    #[test]
    fn unknown_rating_label_fails_listing() {
        let block = r#"<div class="ooa-2p9dfw"><a href="/a">x</a><h3>9 990 EUR</h3>
            <svg></svg><p>Sem avaliação</p></div>"#;
        let err = extract(Layout::Rich, &listing_html(FIELDS, block)).unwrap_err();
        assert_eq!(
            err,
            ExtractionError::UnknownLabel {
                field: "price_class",
                label: "Sem avaliação".to_string()
            }
        );
    }

    #[test]
    fn rating_icon_without_label_fails_listing() {
        let block = r#"<div class="ooa-2p9dfw"><a href="/a">x</a><h3>9 990 EUR</h3><svg></svg></div>"#;
        let err = extract(Layout::Rich, &listing_html(FIELDS, block)).unwrap_err();
        assert_eq!(err, ExtractionError::MissingField { field: "price_class" });
    }

    #[test]
    fn missing_price_fails_listing() {
        let err = extract(Layout::Simple, &listing_html(FIELDS, "")).unwrap_err();
        assert_eq!(err, ExtractionError::MissingField { field: "price" });
    }

    #[test]
    fn engine_line_variants() {
        assert_eq!(
            parse_engine("1 598 cm3 • 120 cv"),
            Some(("1 598".to_string(), "120".to_string()))
        );
        assert_eq!(
            parse_engine("999cm3•68cv"),
            None,
            "three digit displacement needs a leading group"
        );
        assert_eq!(
            parse_engine("Diesel • 1995 cm3 • 150 cv"),
            Some(("1995".to_string(), "150".to_string()))
        );
        assert_eq!(parse_engine("Automática"), None);
    }

    #[test]
    fn digits_only() {
        assert_eq!(digits("price", "12500"), Ok(12500));
        assert!(digits("price", "").is_err());
        assert!(digits("price", "12.500").is_err());
        assert!(digits("price", "-1").is_err());
        assert_eq!(normalize_price(" 7 450 EUR "), "7450");
    }
}
