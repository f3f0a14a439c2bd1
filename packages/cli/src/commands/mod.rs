pub mod apply;
pub mod check;
pub mod inspect;
pub mod publish;

pub use apply::{apply, ApplyArgs};
pub use check::{check, CheckArgs};
pub use inspect::{inspect, InspectArgs};
pub use publish::{publish, PublishArgs};
