use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

use super::settings::Settings;

/// Currency a product is priced in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Dollar,
    Lbp,
}

impl Currency {
    /// The code used in exported files and settings.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Dollar => "DOLLAR",
            Currency::Lbp => "LBP",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = CatalogError;

    /// Parses an exact currency code; `"dollar"` or `" LBP"` are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DOLLAR" => Ok(Currency::Dollar),
            "LBP" => Ok(Currency::Lbp),
            other => Err(CatalogError::UnknownCurrency(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub cost: f64,
    /// Profit rate in percent.
    pub profit_rate: i32,
    pub price: f64,
    pub currency: Currency,
}

impl Product {
    pub fn formatted_price(&self) -> String {
        format_price(self.price, self.currency)
    }

    /// Formats the price in LBP when the product is priced in dollars and a
    /// usable conversion rate is given; otherwise formats the product's own
    /// price.
    pub fn formatted_price_by_dollar(&self, dollar_by_lbp: Option<&str>) -> String {
        let rate = dollar_by_lbp.and_then(parse_lenient);
        match rate {
            Some(rate) if self.currency == Currency::Dollar && rate != 0.0 => {
                format_price(self.price * rate, Currency::Lbp)
            }
            _ => self.formatted_price(),
        }
    }
}

/// Editable product form, numbers kept as the text the user typed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProductDetails {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub cost: String,
    pub profit_rate: i32,
    pub price: String,
    pub currency: Currency,
}

impl ProductDetails {
    /// An empty form carrying the configured default profit rate and currency.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            profit_rate: settings.profit_rate,
            currency: settings.product_currency,
            ..Self::default()
        }
    }

    /// Recomputes the price from cost and profit rate, with two decimals.
    ///
    /// The `1 + rate / 100` factor is computed in single precision, which is
    /// what previously saved prices were computed with. A blank or
    /// non-numeric cost clears the price.
    pub fn calculate_price(&mut self) {
        self.price = match parse_lenient(&self.cost) {
            Some(cost) => {
                let factor = 1.0_f32 + self.profit_rate as f32 / 100.0_f32;
                format!("{:.2}", cost * f64::from(factor))
            }
            None => String::new(),
        };
    }

    /// Name, cost and price are required.
    pub fn is_valid(&self) -> bool {
        !self.name.trim().is_empty() && !self.cost.trim().is_empty() && !self.price.trim().is_empty()
    }

    /// Converts the form into a product; unparsable numbers become `0.0`.
    pub fn to_product(&self) -> Product {
        Product {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            cost: parse_lenient(&self.cost).unwrap_or(0.0),
            profit_rate: self.profit_rate,
            price: parse_lenient(&self.price).unwrap_or(0.0),
            currency: self.currency,
        }
    }
}

impl From<&Product> for ProductDetails {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            description: product.description.clone(),
            cost: format_decimal(product.cost),
            profit_rate: product.profit_rate,
            price: format_decimal(product.price),
            currency: product.currency,
        }
    }
}

/// Renders a stored decimal the way the catalog stores it as text: `12.0`,
/// `12.5`, never `12`.
pub fn format_decimal(value: f64) -> String {
    format!("{:?}", value)
}

/// Parses a decimal, ignoring surrounding whitespace.
pub(crate) fn parse_lenient(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok()
}

/// Formats an amount for display.
///
/// - `Currency::Dollar`: `$1,234.50`
/// - `Currency::Lbp`: `LBP 1,235` (the pound is shown without minor units)
pub fn format_price(amount: f64, currency: Currency) -> String {
    let (prefix, decimals) = match currency {
        Currency::Dollar => ("$", 2),
        Currency::Lbp => ("LBP ", 0),
    };

    let rendered = format!("{:.*}", decimals, amount.abs());
    let (integer, fraction) = match rendered.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (rendered.as_str(), None),
    };

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (index, digit) in integer.chars().enumerate() {
        if index > 0 && (integer.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 && rendered.chars().any(|c| c.is_ascii_digit() && c != '0') {
        "-"
    } else {
        ""
    };

    match fraction {
        Some(fraction) => format!("{}{}{}.{}", sign, prefix, grouped, fraction),
        None => format!("{}{}{}", sign, prefix, grouped),
    }
}
