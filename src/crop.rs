use chrono::NaiveDate;

pub const CROP_NAMES: [&str; 10] = [
    "Wheat",
    "Rice",
    "Corn",
    "Soybean",
    "Barley",
    "Sugarcane",
    "Cotton",
    "Potato",
    "Tomato",
    "Lettuce",
];

pub const GROWTH_STAGES: [&str; 5] = ["Seedling", "Vegetative", "Flowering", "Fruiting", "Maturity"];

pub const PEST_CONTROL_MEASURES: [&str; 6] = [
    "Use of organic pesticides",
    "Crop rotation",
    "Neem oil application",
    "Biological pest control",
    "Chemical pesticides",
    "Regular field monitoring",
];

/// Column headers of the record table. The identifier is never displayed.
pub const DISPLAY_COLUMNS: [&str; 6] = [
    "Crop Name",
    "Planting Date",
    "Harvest Date",
    "Growth Stage",
    "Pest Control",
    "Yield Prediction",
];

/// A crop record that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCrop {
    pub crop_name: String,
    pub planting_date: NaiveDate,
    pub harvest_date: NaiveDate,
    pub growth_stage: String,
    pub pest_control_measures: String,
    /// Kilograms.
    pub yield_prediction: u32,
}

/// A crop record read back from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CropRecord {
    pub id: i64,
    pub crop: NewCrop,
}

impl NewCrop {
    pub fn display_row(&self) -> [String; 6] {
        [
            self.crop_name.clone(),
            self.planting_date.format("%Y-%m-%d").to_string(),
            self.harvest_date.format("%Y-%m-%d").to_string(),
            self.growth_stage.clone(),
            self.pest_control_measures.clone(),
            self.yield_prediction.to_string(),
        ]
    }
}

impl CropRecord {
    pub fn display_row(&self) -> [String; 6] {
        self.crop.display_row()
    }
}

pub fn parse_date(s: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_row_hides_id_and_formats_dates() {
        let record = CropRecord {
            id: 42,
            crop: NewCrop {
                crop_name: "Rice".into(),
                planting_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                harvest_date: NaiveDate::from_ymd_opt(2024, 7, 9).unwrap(),
                growth_stage: "Flowering".into(),
                pest_control_measures: "Crop rotation".into(),
                yield_prediction: 1200,
            },
        };
        let row = record.display_row();
        assert_eq!(row.len(), DISPLAY_COLUMNS.len());
        assert_eq!(row[1], "2024-03-01");
        assert_eq!(row[5], "1200");
        assert!(!row.contains(&"42".to_string()));
    }

    #[test]
    fn parse_date_accepts_iso_only() {
        assert_eq!(
            parse_date(" 2025-02-28 ").unwrap(),
            NaiveDate::from_ymd_opt(2025, 2, 28).unwrap()
        );
        assert!(parse_date("2025-02-30").is_err());
        assert!(parse_date("28/02/2025").is_err());
    }
}
