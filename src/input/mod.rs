pub mod gesture;
pub mod handler;
pub mod throttle;

pub use gesture::SwipeRecognizer;
pub use handler::{InputHandler, KeyAction};
pub use throttle::Throttle;
