//! Physics free functions for Brownian-dynamics bridging.
//!
//! When a protective domain cannot be erected (crowded neighborhoods),
//! propagation falls back to small Brownian-dynamics steps; the functions
//! here supply the 1-D kernels used to accept or reject reactive moves and
//! to place dissociation products.
//!
//! Reference: Morelli & ten Wolde, J Chem Phys 2008 (reaction Brownian dynamics)

mod bd;

pub use bd::{draw_r_gbd_1d, g_bd_1d, i_bd_1d};
