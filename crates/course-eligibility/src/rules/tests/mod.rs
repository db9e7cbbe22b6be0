mod catalog;
mod common;
mod ordinary_level;
