//! Modelo de CustomerType
//!
//! Clasificación cerrada de clientes. `Other` (255) es el valor comodín.

use super::codes::coded_enum;

coded_enum! {
    /// Tipo de cliente
    #[derive(Default)]
    pub enum CustomerType {
        #[default]
        None = 0 => "Unspecified",
        Individual = 1 => "Individual customer",
        Business = 2 => "Business",
        Government = 3 => "Government agency",
        Fleet = 4 => "Fleet owner",
        InsuranceCompany = 5 => "Insurance company",
        Vip = 6 => "VIP customer",
        Other = 255 => "Other customer type",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trips_through_code() {
        for customer_type in CustomerType::ALL {
            let code = customer_type.code();
            assert_eq!(CustomerType::try_from(code).unwrap(), *customer_type);
        }
        assert_eq!(CustomerType::Vip.code(), 6);
        assert_eq!(CustomerType::try_from(6).unwrap(), CustomerType::Vip);
        assert_eq!(CustomerType::Other.code(), 255);
    }

    #[test]
    fn test_unknown_code_rejected() {
        let err = CustomerType::try_from(7).unwrap_err();
        assert_eq!(err.code, "unknown_code");
        assert!(CustomerType::try_from(-1).is_err());
    }

    #[test]
    fn test_serializes_as_snake_case() {
        let json = serde_json::to_string(&CustomerType::InsuranceCompany).unwrap();
        assert_eq!(json, "\"insurance_company\"");
        let parsed: CustomerType = serde_json::from_str("\"vip\"").unwrap();
        assert_eq!(parsed, CustomerType::Vip);
    }

    #[test]
    fn test_labels() {
        assert_eq!(CustomerType::default(), CustomerType::None);
        assert_eq!(CustomerType::Fleet.to_string(), "Fleet owner");
    }
}
