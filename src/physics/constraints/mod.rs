pub mod contact;
pub mod inequality_helpers;
pub mod softness;
