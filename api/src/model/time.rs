// 時刻は "HH:MM" で受け渡しする（"HH:MM:SS" も受け付ける）
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn parse(value: &str) -> Option<NaiveTime> {
        NaiveTime::parse_from_str(value, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
            .ok()
    }

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let value = String::deserialize(deserializer)?;
        parse(&value).ok_or_else(|| D::Error::custom(format!("invalid time: {value}")))
    }
}

#[cfg(test)]
mod tests {
    use super::hhmm;
    use chrono::NaiveTime;

    #[test]
    fn accepts_with_and_without_seconds() {
        let expected = NaiveTime::from_hms_opt(9, 30, 0);
        assert_eq!(hhmm::parse("09:30"), expected);
        assert_eq!(hhmm::parse("09:30:00"), expected);
        assert_eq!(hhmm::parse("9.30"), None);
    }
}
