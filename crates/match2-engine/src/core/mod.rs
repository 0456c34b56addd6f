pub use self::{cell_code::*, factory::*, position::*, tile::*};

pub(crate) mod cell_code;
pub(crate) mod factory;
pub(crate) mod position;
pub(crate) mod tile;
