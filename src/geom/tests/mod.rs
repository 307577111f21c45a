mod test_curves_basic;
mod test_export_basic;
mod test_growth_basic;
mod test_mesh_basic;
