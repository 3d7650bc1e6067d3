//! Clasificaciones de vehículos

use super::codes::coded_enum;

coded_enum! {
    /// Tipo de carrocería
    #[derive(Default)]
    pub enum CarType {
        #[default]
        Sedan = 1 => "Sedan",
        Suv = 2 => "SUV",
        Hatchback = 3 => "Hatchback",
        Coupe = 4 => "Coupe",
        Convertible = 5 => "Convertible",
        Wagon = 6 => "Wagon",
        Pickup = 7 => "Pickup",
        Van = 8 => "Van",
        Minivan = 9 => "Minivan",
        Other = 255 => "Other",
    }
}

coded_enum! {
    #[derive(Default)]
    pub enum CarColor {
        #[default]
        None = 0 => "Unspecified",
        Black = 1 => "Black",
        White = 2 => "White",
        Silver = 3 => "Silver",
        Gray = 4 => "Gray",
        Red = 5 => "Red",
        Blue = 6 => "Blue",
        Green = 7 => "Green",
        Yellow = 8 => "Yellow",
        Brown = 9 => "Brown",
        Orange = 10 => "Orange",
        Other = 255 => "Other",
    }
}

coded_enum! {
    /// Marca del fabricante
    #[derive(Default)]
    pub enum CarBrand {
        #[default]
        None = 0 => "Unspecified",
        Toyota = 1 => "Toyota",
        Honda = 2 => "Honda",
        Hyundai = 3 => "Hyundai",
        Kia = 4 => "Kia",
        Mazda = 5 => "Mazda",
        Ford = 6 => "Ford",
        Mitsubishi = 7 => "Mitsubishi",
        Nissan = 8 => "Nissan",
        Suzuki = 9 => "Suzuki",
        Chevrolet = 10 => "Chevrolet",
        MercedesBenz = 11 => "Mercedes-Benz",
        Bmw = 12 => "BMW",
        Audi = 13 => "Audi",
        Lexus = 14 => "Lexus",
        Other = 255 => "Other",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_unique() {
        let mut codes: Vec<i16> = CarBrand::ALL.iter().map(|b| b.code()).collect();
        codes.dedup();
        assert_eq!(codes.len(), CarBrand::ALL.len());
        assert_eq!(CarType::default(), CarType::Sedan);
        assert_eq!(CarColor::default(), CarColor::None);
    }

    #[test]
    fn test_string_codes() {
        assert_eq!(serde_json::to_string(&CarType::Suv).unwrap(), "\"suv\"");
        assert_eq!(serde_json::to_string(&CarBrand::MercedesBenz).unwrap(), "\"mercedes_benz\"");
        assert_eq!(CarBrand::Bmw.to_string(), "BMW");
    }
}
