#[cfg(target_arch = "wasm32")]
fn main() {
}

#[cfg(all(not(target_arch = "wasm32"), not(feature = "native_cli")))]
fn main() {
    eprintln!(
        "mesh_cli is a native-only tool and requires `--features native_cli`.\n\
         Example: cargo run --bin mesh_cli --features native_cli -- list"
    );
    std::process::exit(1);
}

#[cfg(all(not(target_arch = "wasm32"), feature = "native_cli"))]
fn main() {
    if let Err(err) = native::run() {
        eprintln!("mesh_cli error: {err}");
        std::process::exit(1);
    }
}

#[cfg(all(not(target_arch = "wasm32"), feature = "native_cli"))]
mod native {
    use babsrects_engine::geom::{
        Point3, SweepOptions, Vec2, catmull_polygon_n, catmull_polyline_n, circle, gyroid_offset,
        helix, offset_polyline, position_scaling, rrreefs_profile, scale_function, tweening_z,
    };
    use babsrects_engine::{Engine, Scene};
    use std::fs;
    use std::path::{Path, PathBuf};

    const USAGE: &str = r#"mesh_cli (babsrects-engine)

USAGE:
  mesh_cli list
  mesh_cli run <scenario|all> [options]

SCENARIOS:
  voxel
  box_model
  helix_sweep
  circle_sweep
  rrreefs_loft
  rrreefs_spiral
  growth_pipe
  voxel_edge_tubes

OPTIONS (run):
  --out-dir <dir>    Write <scenario>.obj (or .stl) to this dir (required for `all`)
  --stl              Write ASCII STL instead of OBJ
  --overwrite        Overwrite existing output files
  -h, --help         Show this help
"#;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Format {
        Obj,
        Stl,
    }

    impl Format {
        fn extension(self) -> &'static str {
            match self {
                Format::Obj => "obj",
                Format::Stl => "stl",
            }
        }
    }

    pub fn run() -> Result<(), String> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let mut args = Args::new(args);

        let Some(command) = args.next() else {
            print_usage();
            return Ok(());
        };

        match command.as_str() {
            "list" => {
                print_scenarios();
                Ok(())
            }
            "run" => cmd_run(&mut args),
            "-h" | "--help" | "help" => {
                print_usage();
                Ok(())
            }
            other => Err(format!("unknown command `{other}`\n\n{USAGE}")),
        }
    }

    fn print_usage() {
        println!("{USAGE}");
    }

    fn print_scenarios() {
        for scenario in Scenario::ALL {
            println!("{}", scenario.name());
        }
    }

    fn cmd_run(args: &mut Args) -> Result<(), String> {
        let scenario_name = args.next().ok_or("missing scenario name")?;

        let mut out_dir: Option<PathBuf> = None;
        let mut format = Format::Obj;
        let mut overwrite = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--out-dir" => out_dir = Some(PathBuf::from(args.value("--out-dir")?)),
                "--stl" => format = Format::Stl,
                "--overwrite" => overwrite = true,
                "-h" | "--help" => {
                    print_usage();
                    return Ok(());
                }
                other => return Err(format!("unknown option `{other}`\n\n{USAGE}")),
            }
        }

        let scenarios: Vec<Scenario> = if scenario_name == "all" {
            Scenario::ALL.to_vec()
        } else {
            vec![Scenario::from_str(&scenario_name).ok_or_else(|| unknown_scenario(&scenario_name))?]
        };

        let Some(dir) = out_dir else {
            if scenarios.len() > 1 {
                return Err("`run all` requires --out-dir".to_string());
            }
            let mut engine = Engine::new();
            for scenario in scenarios {
                run_scenario(&mut engine, scenario)?;
                print!("{}", render(&engine, format)?);
                report(&engine);
            }
            return Ok(());
        };

        fs::create_dir_all(&dir).map_err(|e| format!("create out dir: {e}"))?;
        let mut engine = Engine::new();
        for scenario in scenarios {
            run_scenario(&mut engine, scenario)?;
            let path = dir.join(format!("{}.{}", scenario.name(), format.extension()));
            write_text_file(&path, &render(&engine, format)?, overwrite)?;
            eprintln!("wrote {}", path.display());
            report(&engine);
        }
        Ok(())
    }

    fn render(engine: &Engine, format: Format) -> Result<String, String> {
        match format {
            Format::Obj => engine.obj_text(),
            Format::Stl => engine.stl_text(),
        }
        .map_err(|e| format!("export: {e}"))
    }

    fn report(engine: &Engine) {
        if let Some(scene) = engine.scene() {
            eprintln!("{}: {}", scene.name(), summary(scene));
        }
    }

    fn summary(scene: &Scene) -> String {
        let diag = scene.diagnostics();
        let mut text = diag.summary();
        for warning in &diag.warnings {
            text.push_str(&format!("\n  warning: {warning}"));
        }
        text
    }

    fn unknown_scenario(name: &str) -> String {
        let mut msg = String::new();
        msg.push_str(&format!("unknown scenario `{name}`\n\navailable scenarios:\n"));
        for scenario in Scenario::ALL {
            msg.push_str(&format!("  {}\n", scenario.name()));
        }
        msg
    }

    fn write_text_file(path: &Path, text: &str, overwrite: bool) -> Result<(), String> {
        if path.exists() && !overwrite {
            return Err(format!(
                "refusing to overwrite existing file {} (use --overwrite)",
                path.display()
            ));
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| format!("create dir {}: {e}", parent.display()))?;
        }
        fs::write(path, text).map_err(|e| format!("write {}: {e}", path.display()))
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Scenario {
        Voxel,
        BoxModel,
        HelixSweep,
        CircleSweep,
        RrreefsLoft,
        RrreefsSpiral,
        GrowthPipe,
        VoxelEdgeTubes,
    }

    impl Scenario {
        const ALL: &'static [Scenario] = &[
            Scenario::Voxel,
            Scenario::BoxModel,
            Scenario::HelixSweep,
            Scenario::CircleSweep,
            Scenario::RrreefsLoft,
            Scenario::RrreefsSpiral,
            Scenario::GrowthPipe,
            Scenario::VoxelEdgeTubes,
        ];

        fn name(self) -> &'static str {
            match self {
                Scenario::Voxel => "voxel",
                Scenario::BoxModel => "box_model",
                Scenario::HelixSweep => "helix_sweep",
                Scenario::CircleSweep => "circle_sweep",
                Scenario::RrreefsLoft => "rrreefs_loft",
                Scenario::RrreefsSpiral => "rrreefs_spiral",
                Scenario::GrowthPipe => "growth_pipe",
                Scenario::VoxelEdgeTubes => "voxel_edge_tubes",
            }
        }

        fn from_str(name: &str) -> Option<Self> {
            Self::ALL.iter().copied().find(|s| s.name() == name)
        }
    }

    fn run_scenario(engine: &mut Engine, scenario: Scenario) -> Result<(), String> {
        engine.clear();
        engine.set_sweep_config(SweepOptions::default());
        let result = match scenario {
            Scenario::Voxel => engine.rebuild_voxel(10.0).map(|_| ()),
            Scenario::BoxModel => engine.rebuild_box_model(3, 2, 2, 10.0).map(|_| ()),
            Scenario::HelixSweep => {
                let points = helix(Point3::ORIGIN, 5.0, 10.0, 0.05, 200);
                engine
                    .set_polyline_points(points)
                    .and_then(|()| engine.rebuild_sweep().map(|_| ()))
            }
            Scenario::CircleSweep => circle(Point3::ORIGIN, 20.0, 64)
                .map_err(Into::into)
                .and_then(|points| engine.set_polyline_points(points))
                .and_then(|()| engine.rebuild_sweep().map(|_| ())),
            Scenario::RrreefsLoft => rrreefs_layers(12)
                .and_then(|profiles| engine.set_profile_polygons(profiles))
                .and_then(|()| engine.rebuild_loft(false).map(|_| ())),
            Scenario::RrreefsSpiral => {
                engine.set_sweep_config(SweepOptions {
                    radius: 0.8,
                    divisions: 8,
                    ..SweepOptions::default()
                });
                rrreefs_spiral(12)
                    .and_then(|points| engine.set_polyline_points(points))
                    .and_then(|()| engine.rebuild_sweep().map(|_| ()))
            }
            Scenario::GrowthPipe => {
                engine.set_sweep_config(SweepOptions {
                    radius: 4.0,
                    ..SweepOptions::default()
                });
                engine
                    .begin_growth(48, 150.0, Some(7))
                    .and_then(|()| engine.step_growth(25).map(|_| ()))
                    .and_then(|()| engine.rebuild_growth_pipe(0.0).map(|_| ()))
            }
            Scenario::VoxelEdgeTubes => engine.rebuild_edge_tubes(10.0).map(|_| ()),
        };
        result.map_err(|e| format!("{}: {e}", scenario.name()))
    }

    /// Stacked stadium rings, each pushed out by the gyroid field of its layer.
    fn rrreefs_layers(
        layers: usize,
    ) -> Result<Vec<Vec<Point3>>, babsrects_engine::EngineError> {
        let mut profiles = Vec::with_capacity(layers);
        for layer in 0..layers {
            let height = layer as f64 * 2.0;
            let ring = rrreefs_profile(40.0, 10.0, 2.0, height)?;
            let flat: Vec<Vec2> = ring.iter().map(|p| Vec2::new(p.x, p.y)).collect();
            let offset = offset_polyline(&flat, |p, _| gyroid_offset(p, height) * 0.1)?;
            let lifted: Vec<Point3> = offset.into_iter().map(|v| v.to_point3(height)).collect();
            profiles.push(catmull_polygon_n(&lifted, 1));
        }
        Ok(profiles)
    }

    /// The same layers as one continuous print path, tapering in y as it rises.
    fn rrreefs_spiral(layers: usize) -> Result<Vec<Point3>, babsrects_engine::EngineError> {
        const LAYER_HEIGHT: f64 = 2.0;
        let top = layers as f64 * LAYER_HEIGHT;
        let path: Vec<Point3> = tweening_z(&rrreefs_layers(layers)?, LAYER_HEIGHT)
            .into_iter()
            .map(|p| position_scaling(p, |z| scale_function(z, (0.0, top * 2.0))))
            .collect();
        Ok(catmull_polyline_n(&path, 1))
    }

    struct Args {
        args: Vec<String>,
        pos: usize,
    }

    impl Args {
        fn new(args: Vec<String>) -> Self {
            Self { args, pos: 0 }
        }

        fn next(&mut self) -> Option<String> {
            let arg = self.args.get(self.pos)?.clone();
            self.pos += 1;
            Some(arg)
        }

        fn value(&mut self, flag: &str) -> Result<String, String> {
            self.next()
                .ok_or_else(|| format!("missing value for {flag}"))
        }
    }
}
