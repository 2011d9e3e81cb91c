//! Game layer: bumpers, drink recipes, and the scoring controller.
//!
//! ```text
//!   Bumper::on_hit ──score delta──▶ DrinkController ──winner──▶ Drink::pour
//!         │                                                        │
//!         └──(pour_on_hit)──────────▶ PumpBank ◀───────────────────┘
//! ```

pub mod bumper;
pub mod controller;
pub mod drink;

pub use bumper::{Bumper, HitOutcome};
pub use controller::{median_of_three, DrinkController, Poured};
pub use drink::{Drink, DrinkId, PourReport, PumpPour};
