pub mod answer;
pub mod color;
pub mod stimulus;
pub mod trial;

pub use answer::{AnswerSpec, AnswerSpecError, CharOrCode, ExpectedAnswer, KeySpec, score};
pub use color::{ColorRamp, WINTER_ISO, parse_color};
pub use stimulus::{ShapeSpec, ShapeStimulus, StimulusFrame, roundest_radius, sharpest_surface};
pub use trial::{KeyResponse, TrialState};
