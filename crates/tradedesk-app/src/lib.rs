// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod columns;
pub mod forms;
pub mod ids;
pub mod modal;
pub mod model;
pub mod notify;
pub mod query;
pub mod state;
pub mod table;
pub mod validation;
pub mod view;

pub use columns::*;
pub use forms::*;
pub use ids::*;
pub use modal::*;
pub use model::*;
pub use notify::*;
pub use query::*;
pub use state::*;
pub use table::*;
pub use view::*;
