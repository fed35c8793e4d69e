pub mod mesh2d;
