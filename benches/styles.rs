use criterion::{Criterion, criterion_group, criterion_main};
use scan_segmenter::style::{Color, Style, StyleSet, compress_face_ids};
use scan_segmenter::types::Mesh;

/// `faces` triangles striped across `styles` styles in runs of `run` faces.
fn make_striped_set(faces: u32, styles: u32, run: u32) -> StyleSet {
    let palette: Vec<Style> = (0..styles)
        .map(|i| Style::opaque(Color::new(i as f32 / styles as f32, 0.5, 0.25)))
        .collect();

    let mut set = StyleSet::new();
    for face in 0..faces {
        set.assign(palette[((face / run) % styles) as usize], face);
    }
    set
}

fn bench_compress(c: &mut Criterion) {
    // Mostly contiguous ids with a gap every 50 faces
    let ids: Vec<u32> = (0..200_000u32).filter(|i| i % 50 != 49).collect();

    c.bench_function("compress_face_ids_200k", |b| {
        b.iter(|| compress_face_ids(&ids));
    });
}

fn bench_finalize(c: &mut Criterion) {
    let set = make_striped_set(200_000, 8, 16);

    c.bench_function("style_set_finalize_200k", |b| {
        b.iter(|| {
            // `set` itself is never finalized, so every clone starts uncompressed
            let fresh = set.clone();
            fresh.finalize().len()
        });
    });
}

fn bench_style_slots(c: &mut Criterion) {
    let n = 200usize;
    let mut mesh = Mesh::new("IfcWallStandardCase");
    let positions: Vec<f32> = (0..(n + 1) * (n + 1))
        .flat_map(|i| [(i % (n + 1)) as f32, (i / (n + 1)) as f32, 0.0])
        .collect();
    let mut indices = Vec::with_capacity(n * n * 6);
    for y in 0..n {
        for x in 0..n {
            let tl = (y * (n + 1) + x) as u32;
            let bl = tl + (n + 1) as u32;
            indices.extend_from_slice(&[tl, bl, tl + 1, tl + 1, bl, bl + 1]);
        }
    }
    mesh.append_vertices(&positions).unwrap();
    mesh.append_triangles(&indices).unwrap();
    mesh.set_styles(make_striped_set(mesh.triangle_count() as u32, 4, 64));

    c.bench_function("build_renderable_80k_styled", |b| {
        b.iter(|| mesh.build_renderable());
    });
}

criterion_group!(benches, bench_compress, bench_finalize, bench_style_slots);
criterion_main!(benches);
