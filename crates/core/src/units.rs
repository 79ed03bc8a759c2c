use crate::error::ExtractionError;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightUnit {
    Kilogram,
    Gram,
    Pound,
    Ounce,
}

impl WeightUnit {
    fn in_kilograms(self) -> f64 {
        match self {
            WeightUnit::Kilogram => 1.0,
            WeightUnit::Gram => 0.001,
            WeightUnit::Pound => 0.453_592_37,
            WeightUnit::Ounce => 0.028_349_523_125,
        }
    }
}

impl FromStr for WeightUnit {
    type Err = ExtractionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "KILOGRAM" | "KG" | "KGS" => Ok(WeightUnit::Kilogram),
            "GRAM" | "G" => Ok(WeightUnit::Gram),
            "POUND" | "LB" | "LBS" => Ok(WeightUnit::Pound),
            "OUNCE" | "OZ" => Ok(WeightUnit::Ounce),
            _ => Err(ExtractionError::UnknownUnit(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimensionUnit {
    Centimeter,
    Millimeter,
    Meter,
    Inch,
}

impl DimensionUnit {
    fn in_centimeters(self) -> f64 {
        match self {
            DimensionUnit::Centimeter => 1.0,
            DimensionUnit::Millimeter => 0.1,
            DimensionUnit::Meter => 100.0,
            DimensionUnit::Inch => 2.54,
        }
    }
}

impl FromStr for DimensionUnit {
    type Err = ExtractionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CENTIMETER" | "CM" => Ok(DimensionUnit::Centimeter),
            "MILLIMETER" | "MM" => Ok(DimensionUnit::Millimeter),
            "METER" | "M" => Ok(DimensionUnit::Meter),
            "INCH" | "IN" => Ok(DimensionUnit::Inch),
            _ => Err(ExtractionError::UnknownUnit(s.to_string())),
        }
    }
}

/// Converts package measures into the units a carrier requires.
pub trait UnitConverter: Send + Sync {
    fn convert_weight(&self, value: f64, from: WeightUnit, to: WeightUnit) -> f64;
    fn convert_dimension(&self, value: f64, from: DimensionUnit, to: DimensionUnit) -> f64;
}

/// Factor based conversion. Weights are rounded to grams, dimensions to whole units.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultUnitConverter;

impl UnitConverter for DefaultUnitConverter {
    fn convert_weight(&self, value: f64, from: WeightUnit, to: WeightUnit) -> f64 {
        if from == to {
            return value;
        }
        let converted = value * from.in_kilograms() / to.in_kilograms();
        (converted * 1000.0).round() / 1000.0
    }

    fn convert_dimension(&self, value: f64, from: DimensionUnit, to: DimensionUnit) -> f64 {
        if from == to {
            return value;
        }
        (value * from.in_centimeters() / to.in_centimeters()).round()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(2.0, WeightUnit::Pound, 0.907)]
    #[case(1500.0, WeightUnit::Gram, 1.5)]
    #[case(16.0, WeightUnit::Ounce, 0.454)]
    #[case(1.25, WeightUnit::Kilogram, 1.25)]
    fn test_convert_weight_to_kilograms(
        #[case] value: f64,
        #[case] unit: WeightUnit,
        #[case] expected: f64,
    ) {
        let kg = DefaultUnitConverter.convert_weight(value, unit, WeightUnit::Kilogram);
        assert!((kg - expected).abs() < 1e-9, "{kg} != {expected}");
    }

    #[rstest]
    #[case(10.0, DimensionUnit::Inch, 25.0)]
    #[case(350.0, DimensionUnit::Millimeter, 35.0)]
    #[case(0.6, DimensionUnit::Meter, 60.0)]
    fn test_convert_dimension_to_centimeters(
        #[case] value: f64,
        #[case] unit: DimensionUnit,
        #[case] expected: f64,
    ) {
        let cm = DefaultUnitConverter.convert_dimension(value, unit, DimensionUnit::Centimeter);
        assert_eq!(cm, expected);
    }

    #[test]
    fn test_parse_platform_unit_names() {
        assert_eq!("KILOGRAM".parse::<WeightUnit>(), Ok(WeightUnit::Kilogram));
        assert_eq!("pound".parse::<WeightUnit>(), Ok(WeightUnit::Pound));
        assert_eq!("INCH".parse::<DimensionUnit>(), Ok(DimensionUnit::Inch));
        assert_eq!(
            "STONE".parse::<WeightUnit>(),
            Err(ExtractionError::UnknownUnit("STONE".to_string()))
        );
    }
}
