pub mod contact_constraint;
pub mod contact_prepare;
pub mod contact_solve;
pub mod penetration_limit;
pub mod restitution;
pub mod rolling_resistance;
pub mod tangent_friction;
