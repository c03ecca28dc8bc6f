pub mod ctrl1;
pub mod ctrl2;
pub mod press_out;
pub mod status;
pub mod who_am_i;
