use chrono::{DateTime, Utc};
use num_derive::FromPrimitive;
use strum::{Display, EnumString};

#[derive(Clone, Copy, Debug, Display, EnumString, Eq, Hash, PartialEq)]
#[strum(ascii_case_insensitive)]
pub enum Sex {
    #[strum(serialize = "M")]
    Male,
    #[strum(serialize = "F")]
    Female,
}

/// Activity tier as entered by the user, from mostly sitting (1) to
/// hard daily training (5).
#[derive(Clone, Copy, Debug, Eq, FromPrimitive, Hash, PartialEq)]
pub enum ActivityLevel {
    Sedentary = 1,
    Light = 2,
    Moderate = 3,
    Active = 4,
    VeryActive = 5,
}

impl ActivityLevel {
    pub fn from_tier(tier: i64) -> Option<Self> {
        num::FromPrimitive::from_i64(tier)
    }

    pub fn tier(self) -> u8 {
        self as u8
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct UserProfile {
    pub user_id: i64,
    pub chat_id: i64,
    pub name: Option<String>,
    pub sex: Option<Sex>,
    pub age: Option<u16>,
    pub height_cm: Option<u16>,
    pub weight_kg: Option<f64>,
    pub activity: Option<ActivityLevel>,
    pub updated_at: DateTime<Utc>,
}

/// Partial profile update. A `None` slot leaves the stored value untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub sex: Option<Sex>,
    pub age: Option<u16>,
    pub height_cm: Option<u16>,
    pub weight_kg: Option<f64>,
    pub activity: Option<ActivityLevel>,
}

/// A complete set of profile attributes, as entered with `/setprofile`.
#[derive(Clone, Debug, PartialEq)]
pub struct ProfileDetails {
    pub name: String,
    pub sex: Sex,
    pub age: u16,
    pub height_cm: u16,
    pub weight_kg: f64,
    pub activity: ActivityLevel,
}

impl From<ProfileDetails> for ProfilePatch {
    fn from(details: ProfileDetails) -> Self {
        Self {
            name: Some(details.name),
            sex: Some(details.sex),
            age: Some(details.age),
            height_cm: Some(details.height_cm),
            weight_kg: Some(details.weight_kg),
            activity: Some(details.activity),
        }
    }
}
