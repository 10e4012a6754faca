use std::fmt::Display;

use fitbot_db::ProfileRepository;
use fitbot_model::{
    metrics::{self, EnergyEstimate},
    profile::UserProfile,
};
use log::{debug, info};

use crate::{
    command::{Command, EditError, SetProfileError},
    Error,
};

pub const HELP: &str = "Hi! I can store your fitness profile and do quick checks.

Commands:
/setprofile Name, Sex(M/F), Age, Height_cm, Weight_kg, Activity(1-5)
  e.g.  /setprofile Ace, M, 22, 175, 76, 3

/profile  → show your saved data
/bmi      → your BMI + category
/cutcal   → daily calories to lose weight (modest cut)
/edit field value  → update one item (fields: name, sex, age, height, weight, activity)
  e.g.  /edit weight 74.5
";

pub const NO_COMMAND: &str = "Use /start for help.";
pub const UNKNOWN_COMMAND: &str = "Unknown command. Use /start for help.";
pub const NO_PROFILE: &str = "No profile yet. Set it with:\n\
/setprofile Name, Sex(M/F), Age, Height_cm, Weight_kg, Activity(1-5)";
pub const SETPROFILE_FORMAT: &str =
    "Format:\n/setprofile Name, Sex(M/F), Age, Height_cm, Weight_kg, Activity(1-5)";
pub const SETPROFILE_EXAMPLE: &str =
    "Could not read that. Example:\n/setprofile Ace, M, 22, 175, 76, 3";
pub const PROFILE_SAVED: &str = "Saved ✅  (Use /profile to check)";
pub const EDIT_FORMAT: &str =
    "Format:\n/edit field value\nFields: name, sex(M/F), age, height, weight, activity(1-5)";
pub const EDIT_EXAMPLE: &str = "Could not update. Example:\n/edit weight 74.5";
pub const EDIT_UNKNOWN_FIELD: &str = "Unknown field.";
pub const PROFILE_UPDATED: &str = "Updated ✅";
pub const BMI_NEEDS_PROFILE: &str = "Please set height & weight first:\n\
/setprofile Name, Sex(M/F), Age, Height_cm, Weight_kg, Activity(1-5)";
pub const CUTCAL_NEEDS_PROFILE: &str = "Please complete your profile first with /setprofile.";

const UNSET: &str = "not set";

/// Identity of the participant a command came from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Sender {
    pub user_id: i64,
    pub chat_id: i64,
}

pub struct Dispatcher {
    repository: Box<dyn ProfileRepository>,
}

impl Dispatcher {
    pub fn new(repository: Box<dyn ProfileRepository>) -> Self {
        Self { repository }
    }

    /// Runs `command` for `sender` and returns the reply text.
    ///
    /// Invalid input and missing profile data are answered with guidance;
    /// only storage failures come back as errors.
    pub async fn dispatch(&self, sender: Sender, command: Command) -> Result<String, Error> {
        let reply = match command {
            Command::NoCommand => NO_COMMAND.to_owned(),
            Command::ShowHelp => HELP.to_owned(),
            Command::ShowProfile => match self.repository.get(sender.user_id).await? {
                Some(profile) => render_profile(&profile),
                None => NO_PROFILE.to_owned(),
            },
            Command::SetProfile(details) => {
                info!("Saving full profile of user {}", sender.user_id);
                self.repository
                    .upsert(sender.user_id, sender.chat_id, details.into())
                    .await?;
                PROFILE_SAVED.to_owned()
            }
            Command::SetProfileInvalid(SetProfileError::MissingArguments) => {
                SETPROFILE_FORMAT.to_owned()
            }
            Command::SetProfileInvalid(e) => {
                debug!("Rejected /setprofile from user {}: {}", sender.user_id, e);
                SETPROFILE_EXAMPLE.to_owned()
            }
            Command::Edit(edit) => {
                info!("Updating profile of user {}: {:?}", sender.user_id, edit);
                self.repository
                    .upsert(sender.user_id, sender.chat_id, edit.into())
                    .await?;
                PROFILE_UPDATED.to_owned()
            }
            Command::EditInvalid(EditError::MissingArguments) => EDIT_FORMAT.to_owned(),
            Command::EditInvalid(e) => {
                debug!("Rejected /edit from user {}: {}", sender.user_id, e);
                EDIT_EXAMPLE.to_owned()
            }
            Command::EditUnknownField(field) => {
                debug!("User {} tried to edit {:?}", sender.user_id, field);
                EDIT_UNKNOWN_FIELD.to_owned()
            }
            Command::ComputeBmi => self.compute_bmi(sender).await?,
            Command::ComputeCutCalories => self.compute_cut_calories(sender).await?,
            Command::Unrecognized(token) => {
                debug!("Unrecognized command {:?}", token);
                UNKNOWN_COMMAND.to_owned()
            }
        };
        Ok(reply)
    }

    async fn compute_bmi(&self, sender: Sender) -> Result<String, Error> {
        let profile = self.repository.get(sender.user_id).await?;
        let Some((height_cm, weight_kg)) = profile.and_then(|p| p.height_cm.zip(p.weight_kg))
        else {
            return Ok(BMI_NEEDS_PROFILE.to_owned());
        };

        let bmi = metrics::bmi(height_cm, weight_kg);
        Ok(format!("BMI: {:.1} ({})", bmi, metrics::bmi_category(bmi)))
    }

    async fn compute_cut_calories(&self, sender: Sender) -> Result<String, Error> {
        let estimate = self
            .repository
            .get(sender.user_id)
            .await?
            .and_then(|p| {
                Some(EnergyEstimate::new(
                    p.sex?,
                    p.age?,
                    p.height_cm?,
                    p.weight_kg?,
                    p.activity?.tier(),
                ))
            });
        let Some(estimate) = estimate else {
            return Ok(CUTCAL_NEEDS_PROFILE.to_owned());
        };

        Ok(format!(
            "Estimated maintenance (TDEE): {:.0} kcal/day\n\
             Suggested to lose weight: ~{:.0} kcal/day (300–500 kcal deficit).",
            estimate.tdee, estimate.deficit_target
        ))
    }
}

fn render_profile(profile: &UserProfile) -> String {
    format!(
        "Your profile:\n\
         Name: {}\n\
         Sex: {}\n\
         Age: {}\n\
         Height: {}\n\
         Weight: {}\n\
         Activity (1-5): {}",
        or_unset(profile.name.as_deref(), ""),
        or_unset(profile.sex, ""),
        or_unset(profile.age, ""),
        or_unset(profile.height_cm, " cm"),
        or_unset(profile.weight_kg, " kg"),
        or_unset(profile.activity.map(|a| a.tier()), ""),
    )
}

fn or_unset<T: Display>(value: Option<T>, unit: &str) -> String {
    match value {
        Some(value) => format!("{}{}", value, unit),
        None => UNSET.to_owned(),
    }
}
