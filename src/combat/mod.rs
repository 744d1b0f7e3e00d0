pub mod damage;
pub mod to_hit;

pub use damage::{
    apply_damage, damage_applier_for, Absorption, CriticalPolicy, DamageApplier, DamageReport,
    DamageSettings, HitDetails, LocationSelector,
};
pub use to_hit::{
    attack_to_hit, engagement_to_hit, nerve_to_hit, skill_modifier, withdraw_to_hit, RollOutcome,
    ToHitData, ToHitModifier, ToHitValue,
};
