use std::str::FromStr;

use fitbot_model::profile::{ActivityLevel, ProfileDetails, ProfilePatch, Sex};
use log::debug;

const COMMAND_PREFIX: char = '/';

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Text without the command prefix.
    NoCommand,
    ShowHelp,
    ShowProfile,
    SetProfile(ProfileDetails),
    SetProfileInvalid(SetProfileError),
    Edit(FieldEdit),
    EditInvalid(EditError),
    EditUnknownField(String),
    ComputeBmi,
    ComputeCutCalories,
    Unrecognized(String),
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum SetProfileError {
    #[error("no profile values given")]
    MissingArguments,
    #[error("expected 6 values, got {0}")]
    FieldCount(usize),
    #[error("invalid {0}")]
    InvalidField(&'static str),
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum EditError {
    #[error("no field given")]
    MissingArguments,
    #[error("no value given for {0}")]
    MissingValue(String),
    #[error("invalid {0}")]
    InvalidValue(String),
}

/// A single-attribute profile change, as entered with `/edit`.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldEdit {
    Name(String),
    Sex(Sex),
    Age(u16),
    Height(u16),
    Weight(f64),
    Activity(ActivityLevel),
}

impl From<FieldEdit> for ProfilePatch {
    fn from(edit: FieldEdit) -> Self {
        let mut patch = ProfilePatch::default();
        match edit {
            FieldEdit::Name(name) => patch.name = Some(name),
            FieldEdit::Sex(sex) => patch.sex = Some(sex),
            FieldEdit::Age(age) => patch.age = Some(age),
            FieldEdit::Height(height_cm) => patch.height_cm = Some(height_cm),
            FieldEdit::Weight(weight_kg) => patch.weight_kg = Some(weight_kg),
            FieldEdit::Activity(activity) => patch.activity = Some(activity),
        }
        patch
    }
}

pub fn parse(text: &str) -> Command {
    let text = text.trim();
    if !text.starts_with(COMMAND_PREFIX) {
        return Command::NoCommand;
    }

    let (token, rest) = match text.split_once(char::is_whitespace) {
        Some((token, rest)) => (token, Some(rest.trim())),
        None => (text, None),
    };
    let token = token.to_lowercase();
    debug!("Parsed command token {:?}", token);

    match token.as_str() {
        "/start" | "/help" => Command::ShowHelp,
        "/profile" => Command::ShowProfile,
        "/setprofile" => match parse_profile_details(rest) {
            Ok(details) => Command::SetProfile(details),
            Err(e) => Command::SetProfileInvalid(e),
        },
        "/edit" => parse_edit(rest),
        "/bmi" => Command::ComputeBmi,
        "/cutcal" => Command::ComputeCutCalories,
        _ => Command::Unrecognized(token),
    }
}

fn parse_profile_details(rest: Option<&str>) -> Result<ProfileDetails, SetProfileError> {
    let rest = rest.ok_or(SetProfileError::MissingArguments)?;
    let parts: Vec<&str> = rest.split(',').map(str::trim).collect();
    let [name, sex, age, height_cm, weight_kg, activity] = parts[..] else {
        return Err(SetProfileError::FieldCount(parts.len()));
    };

    Ok(ProfileDetails {
        name: name.to_owned(),
        sex: parse_sex(sex).ok_or(SetProfileError::InvalidField("sex"))?,
        age: parse_positive(age).ok_or(SetProfileError::InvalidField("age"))?,
        height_cm: parse_positive(height_cm).ok_or(SetProfileError::InvalidField("height"))?,
        weight_kg: parse_weight(weight_kg).ok_or(SetProfileError::InvalidField("weight"))?,
        activity: parse_activity(activity).ok_or(SetProfileError::InvalidField("activity"))?,
    })
}

fn parse_edit(rest: Option<&str>) -> Command {
    let Some(rest) = rest else {
        return Command::EditInvalid(EditError::MissingArguments);
    };
    let (field, value) = match rest.split_once(char::is_whitespace) {
        Some((field, value)) => (field.to_lowercase(), value.trim()),
        None => (rest.trim().to_lowercase(), ""),
    };
    // A field without a value is malformed, whether or not the field exists.
    if value.is_empty() {
        return Command::EditInvalid(EditError::MissingValue(field));
    }

    let parsed = match field.as_str() {
        "name" => Some(FieldEdit::Name(value.to_owned())),
        "sex" => parse_sex(value).map(FieldEdit::Sex),
        "age" => parse_positive(value).map(FieldEdit::Age),
        "height" => parse_positive(value).map(FieldEdit::Height),
        "weight" => parse_weight(value).map(FieldEdit::Weight),
        "activity" => parse_activity(value).map(FieldEdit::Activity),
        _ => return Command::EditUnknownField(field),
    };
    match parsed {
        Some(edit) => Command::Edit(edit),
        None => Command::EditInvalid(EditError::InvalidValue(field)),
    }
}

fn parse_sex(value: &str) -> Option<Sex> {
    Sex::from_str(value).ok()
}

fn parse_positive(value: &str) -> Option<u16> {
    value.parse::<u16>().ok().filter(|v| *v > 0)
}

fn parse_weight(value: &str) -> Option<f64> {
    value
        .parse::<f64>()
        .ok()
        .filter(|w| w.is_finite() && *w > 0.0)
}

fn parse_activity(value: &str) -> Option<ActivityLevel> {
    value.parse::<i64>().ok().and_then(ActivityLevel::from_tier)
}
