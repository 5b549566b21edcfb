use quiz_core::model::{ExamSettings, TimeUnit};

/// Raw state of the exam settings form on the quiz landing page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExamSettingsForm {
    pub timed: bool,
    pub limit: String,
    pub unit: TimeUnit,
}

impl Default for ExamSettingsForm {
    fn default() -> Self {
        Self {
            timed: true,
            limit: ExamSettings::DEFAULT_TIME_LIMIT.to_string(),
            unit: TimeUnit::Minutes,
        }
    }
}

impl ExamSettingsForm {
    /// # Errors
    ///
    /// Returns a message for the form when the limit is not a positive number.
    pub fn to_settings(&self) -> Result<ExamSettings, &'static str> {
        if !self.timed {
            return Ok(ExamSettings::untimed());
        }
        let limit = self
            .limit
            .trim()
            .parse::<u32>()
            .map_err(|_| "Enter the time limit as a whole number.")?;
        ExamSettings::timed(limit, self.unit).map_err(|_| "The time limit must be at least 1.")
    }
}

#[must_use]
pub fn unit_key(unit: TimeUnit) -> &'static str {
    match unit {
        TimeUnit::Minutes => "minutes",
        TimeUnit::Hours => "hours",
    }
}

#[must_use]
pub fn unit_from_key(key: &str) -> TimeUnit {
    match key {
        "hours" => TimeUnit::Hours,
        _ => TimeUnit::Minutes,
    }
}
