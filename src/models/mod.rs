pub mod city;
pub mod demand;
pub mod package;
pub mod resource;
