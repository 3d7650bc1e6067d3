//! Dominio de un taller mecánico: vehículos, empleados, órdenes de
//! reparación y transacciones, con persistencia en PostgreSQL.

pub mod config;
pub mod database;
pub mod models;
pub mod repositories;
pub mod services;
pub mod utils;
