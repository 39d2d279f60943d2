//! Free-text normalization for spreadsheet cells.
//!
//! The legacy sheets were filled in by hand, so every classifier here is an
//! ordered substring match with a fallback, and every number may arrive with
//! a decimal comma or a placeholder dash.

use crate::entities::maintenance_order::{OrderStatus, OrderType, Requester};
use chrono::NaiveDate;
use rust_decimal::Decimal;

const KNOWN_NUMERALS: &[&str] = &["5001", "5002", "5003", "5005", "5007", "5008", "5013"];
const DEFAULT_NUMERAL: &str = "5001";

/// Trims a cell, treating empty and "-" placeholders as absent.
pub fn clean_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "-" {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Integer cells sometimes carry decimal commas ("12,0").
pub fn to_int(raw: &str) -> Option<i32> {
    let cleaned = clean_text(raw)?;
    cleaned.replace(',', ".").parse::<f64>().ok().map(|v| v as i32)
}

pub fn to_decimal(raw: &str) -> Option<Decimal> {
    let cleaned = clean_text(raw)?;
    cleaned.replace(',', ".").parse::<Decimal>().ok()
}

/// Dates appear as ISO, ISO with a time suffix, or day-first.
pub fn to_date(raw: &str) -> Option<NaiveDate> {
    let cleaned = clean_text(raw)?;

    if let Ok(date) = NaiveDate::parse_from_str(&cleaned, "%Y-%m-%d") {
        return Some(date);
    }
    if let Some(first) = cleaned.split_whitespace().next() {
        if let Ok(date) = NaiveDate::parse_from_str(first, "%Y-%m-%d") {
            return Some(date);
        }
        if let Ok(date) = NaiveDate::parse_from_str(first, "%d/%m/%Y") {
            return Some(date);
        }
    }
    None
}

pub fn parse_requester(raw: &str) -> Option<Requester> {
    let text = raw.to_uppercase();
    if text.contains("BAVEX") {
        Some(Requester::Bavex)
    } else if text.contains("BMS") {
        Some(Requester::Bms)
    } else {
        None
    }
}

pub fn parse_order_type(raw: &str) -> Option<OrderType> {
    let text = raw.to_uppercase();
    if text.contains("FSM") {
        Some(OrderType::Fsm)
    } else if text.contains("RMS") {
        Some(OrderType::Rms)
    } else if text.contains("REQ") {
        Some(OrderType::Req)
    } else {
        None
    }
}

/// Status classification, first match wins. "partially supplied" must be
/// checked before the plain "supplied" substring it contains.
pub fn parse_status(raw: &str) -> OrderStatus {
    let text = raw.to_uppercase();
    if text.is_empty() {
        return OrderStatus::Open;
    }
    if text.contains("ATENDIDO PARCIALMENTE") || text.contains("PARCIAL") {
        OrderStatus::OpenPartial
    } else if text.contains("NÃO ATENDIDO") || text.contains("NAO ATENDIDO") {
        OrderStatus::ClosedUnattended
    } else if text.contains("ATENDIDO") {
        OrderStatus::Closed
    } else {
        OrderStatus::Open
    }
}

/// Splits a combined "doc + publication" cell into the document kind and the
/// remaining reference. ECMM must be probed before the CMM/MMA substrings it
/// contains.
pub fn parse_doc_ref(raw: &str) -> (Option<String>, Option<String>) {
    let Some(cleaned) = clean_text(raw) else {
        return (None, None);
    };
    let upper = cleaned.to_uppercase();

    for kind in ["IPC", "ECMM", "MMA", "AMM", "CMM"] {
        if upper.contains(kind) {
            let reference = upper.replace(kind, "").trim().to_string();
            let reference = if reference.is_empty() {
                None
            } else {
                Some(reference)
            };
            return (Some(kind.to_string()), reference);
        }
    }
    (None, Some(cleaned))
}

pub fn parse_bool(raw: &str) -> bool {
    let text = raw.trim().to_lowercase();
    if text.is_empty() {
        return false;
    }
    text.starts_with('s') || text == "1" || text.contains("yes") || text.contains("sim")
}

/// Resolves a free-text aircraft cell to a canonical tail numeral.
/// Unmatched non-empty text falls back to the fleet's default airframe.
pub fn aircraft_numeral(raw: &str) -> Option<String> {
    let cleaned = clean_text(raw)?;
    let upper = cleaned.to_uppercase();

    for numeral in KNOWN_NUMERALS {
        if upper.contains(numeral) || upper.contains(&format!("EB{}", numeral)) {
            return Some((*numeral).to_string());
        }
    }
    if upper.contains("KAN") {
        return Some("KAN".to_string());
    }
    Some(DEFAULT_NUMERAL.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn clean_text_strips_placeholders() {
        assert_eq!(clean_text("  FUEL PUMP "), Some("FUEL PUMP".to_string()));
        assert_eq!(clean_text(" - "), None);
        assert_eq!(clean_text(""), None);
    }

    #[test]
    fn to_int_accepts_decimal_comma() {
        assert_eq!(to_int("12"), Some(12));
        assert_eq!(to_int("12,0"), Some(12));
        assert_eq!(to_int("3.0"), Some(3));
        assert_eq!(to_int("-"), None);
        assert_eq!(to_int("abc"), None);
    }

    #[test]
    fn to_date_accepts_known_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(to_date("2024-03-15"), Some(expected));
        assert_eq!(to_date("2024-03-15 00:00:00"), Some(expected));
        assert_eq!(to_date("15/03/2024"), Some(expected));
        assert_eq!(to_date("15th of March"), None);
    }

    #[test_case("1º BAvEx" => Some(Requester::Bavex))]
    #[test_case("bavex" => Some(Requester::Bavex))]
    #[test_case("B Mnt Sup - BMS" => Some(Requester::Bms))]
    #[test_case("someone else" => None)]
    fn requester_classification(raw: &str) -> Option<Requester> {
        parse_requester(raw)
    }

    #[test_case("Pedido FSM" => Some(OrderType::Fsm))]
    #[test_case("rms" => Some(OrderType::Rms))]
    #[test_case("REQUISIÇÃO" => Some(OrderType::Req))]
    #[test_case("??" => None)]
    fn order_type_classification(raw: &str) -> Option<OrderType> {
        parse_order_type(raw)
    }

    #[test]
    fn status_prefers_partial_over_supplied() {
        assert_eq!(parse_status("ATENDIDO PARCIALMENTE"), OrderStatus::OpenPartial);
        assert_eq!(parse_status("atendido"), OrderStatus::Closed);
        assert_eq!(parse_status("NÃO ATENDIDO"), OrderStatus::ClosedUnattended);
        assert_eq!(parse_status("NAO ATENDIDO"), OrderStatus::ClosedUnattended);
        assert_eq!(parse_status(""), OrderStatus::Open);
        assert_eq!(parse_status("whatever"), OrderStatus::Open);
    }

    #[test]
    fn doc_ref_splits_kind_and_reference() {
        assert_eq!(
            parse_doc_ref("IPC 32-41-11"),
            (Some("IPC".to_string()), Some("32-41-11".to_string()))
        );
        // ECMM wins over the CMM substring it contains.
        assert_eq!(
            parse_doc_ref("ECMM 71-00"),
            (Some("ECMM".to_string()), Some("71-00".to_string()))
        );
        assert_eq!(parse_doc_ref("manual 123"), (None, Some("manual 123".to_string())));
        assert_eq!(parse_doc_ref("-"), (None, None));
    }

    #[test]
    fn bool_parsing_matches_sheet_conventions() {
        assert!(parse_bool("sim"));
        assert!(parse_bool("S"));
        assert!(parse_bool("1"));
        assert!(parse_bool("yes"));
        assert!(!parse_bool("não"));
        assert!(!parse_bool(""));
    }

    #[test]
    fn aircraft_resolution_prefers_known_numerals() {
        assert_eq!(aircraft_numeral("EB5003"), Some("5003".to_string()));
        assert_eq!(aircraft_numeral("5007 (hangar)"), Some("5007".to_string()));
        assert_eq!(aircraft_numeral("KANARIS"), Some("KAN".to_string()));
        assert_eq!(aircraft_numeral("unknown tail"), Some("5001".to_string()));
        assert_eq!(aircraft_numeral(""), None);
    }
}
