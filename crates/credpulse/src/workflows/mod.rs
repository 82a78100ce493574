pub mod factoring;
