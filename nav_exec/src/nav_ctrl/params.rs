//! Parameters structure for NavCtrl

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

use crate::{
    avoid::AvoidParams, geom::Playground, obstacle::DynamicParams, plan::PlannerParams,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters for navigation control.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Params {
    /// Parameter file holding the static obstacles, relative to the parameters directory
    pub obstacles_file: String,

    pub playground: Playground,

    pub planner: PlannerParams,

    pub avoid: AvoidParams,

    pub dynamic: DynamicParams,
}
