mod exam_settings_vm;
mod library_vm;
mod quiz_vm;
mod results_vm;
mod time_fmt;
mod toast_vm;

pub use exam_settings_vm::{ExamSettingsForm, unit_from_key, unit_key};
pub use library_vm::{QuizCardVm, UploadForm, map_quiz_card, parse_question_count};
pub use quiz_vm::{
    NavCellVm, OptionState, OptionVm, QuestionVm, SessionVm, TIMER_WARNING_SECS, map_session,
    option_letter, option_state,
};
pub use results_vm::{ResultsVm, ReviewItemVm, map_results};
pub use time_fmt::{format_countdown, format_datetime};
pub use toast_vm::{TOAST_TTL, ToastChannel, ToastVm, map_toast};
