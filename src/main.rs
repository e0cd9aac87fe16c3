use dmpe::prelude::*;

fn main() {
    let scene = Scene::holiday(None);
    if let Err(err) = Viewer::new(scene).run() {
        eprintln!("Viewer error: {}", err);
        std::process::exit(1);
    }
}
