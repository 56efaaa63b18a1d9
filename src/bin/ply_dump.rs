use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use mow_ply_lib::d3d::fvf_names;
use mow_ply_lib::ply::{self, mesh_flag_names, DecodeOptions, PlyDocument};
use ptree::{print_tree, TreeBuilder};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ply-dump")]
#[command(author, version, about = "Inspect EPLY mesh files", long_about = None)]
struct Args {
    /// Path to the EPLY file
    file: PathBuf,

    /// Also write the geometry as Wavefront OBJ
    #[arg(long, value_name = "PATH")]
    obj: Option<PathBuf>,

    /// Print the decoded document as JSON instead of a tree
    #[arg(long)]
    json: bool,

    /// Keep what was decoded before an unknown chunk instead of failing
    #[arg(long)]
    lenient: bool,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn init_logging(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn build_tree(name: &str, doc: &PlyDocument) -> TreeBuilder {
    let mut tree = TreeBuilder::new(name.to_string());

    tree.begin_child(format!("meshes ({})", doc.meshes.len()));
    for (i, mesh) in doc.meshes.iter().enumerate() {
        tree.begin_child(format!(
            "[{}] fvf {:#06x} {}",
            i,
            mesh.fvf,
            fvf_names(mesh.fvf).join("|")
        ));
        tree.add_empty_child(format!("flags: {}", mesh_flag_names(mesh.flags).join(", ")));
        tree.add_empty_child(format!(
            "faces: first {} count {}",
            mesh.first_face, mesh.face_count
        ));
        if let Some(rgba) = mesh.specular_color {
            tree.add_empty_child(format!("specular: {:?}", rgba));
        }
        if let Some(material) = &mesh.material_file {
            tree.add_empty_child(format!("material: {}", material));
        }
        if !mesh.subskin_bones.is_empty() {
            let names: Vec<_> = doc
                .subskin_bone_names(mesh)
                .into_iter()
                .map(|n| n.unwrap_or("?"))
                .collect();
            tree.add_empty_child(format!("subskin: {}", names.join(", ")));
        }
        tree.add_empty_child(format!(
            "vertices: {} (size {:?}, flags {:?})",
            mesh.vertex_count(),
            mesh.vertex_size,
            mesh.vertex_flags.map(|f| format!("{:#06x}", f))
        ));
        tree.add_empty_child(format!("triangles: {}", mesh.triangle_count()));
        tree.end_child();
    }
    tree.end_child();

    if !doc.bones.is_empty() {
        tree.begin_child(format!("bones ({})", doc.bones.len()));
        for (i, bone) in doc.bones.iter().enumerate() {
            tree.add_empty_child(format!("[{}] {}", i, bone.name));
        }
        tree.end_child();
    }

    if let Some(bounds) = &doc.bounds {
        tree.add_empty_child(format!(
            "bounds: ({:.3}, {:.3}, {:.3}) .. ({:.3}, {:.3}, {:.3})",
            bounds.min.x, bounds.min.y, bounds.min.z, bounds.max.x, bounds.max.y, bounds.max.z
        ));
    }

    if let Some(tail) = &doc.unparsed_tail {
        tree.add_empty_child(format!(
            "unparsed: {} at {:#x}",
            String::from_utf8_lossy(&tail.tag),
            tail.offset
        ));
    }

    tree
}

fn run(args: &Args) -> anyhow::Result<()> {
    let options = if args.lenient {
        DecodeOptions::lenient()
    } else {
        DecodeOptions::from_env()
    };
    let doc = ply::load_ply_with(&args.file, &options)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&doc)?);
    } else {
        let name = args.file.display().to_string();
        print_tree(&build_tree(&name, &doc).build()).context("Failed to print tree")?;
    }

    if let Some(obj_path) = &args.obj {
        ply::save_obj(&doc, obj_path)?;
        tracing::info!(path = %obj_path.display(), "wrote obj");
    }

    Ok(())
}

fn main() {
    let args = Args::parse();
    init_logging(&args.log_level);

    if let Err(e) = run(&args) {
        eprintln!("ply-dump failed: {:?}", e);
        std::process::exit(1);
    }
}
