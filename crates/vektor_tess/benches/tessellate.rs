use criterion::{black_box, criterion_group, criterion_main, Criterion};
use vektor_core::{Affine2D, CornerRadius, LineCap, LineJoin, Point, Rect};
use vektor_tess::{
    expand_fill, expand_stroke, flatten, CommandBuffer, PathCache, StrokeStyle, Tolerance,
};

fn build_shapes(commands: &mut CommandBuffer, count: usize) {
    let xform = Affine2D::IDENTITY;
    for i in 0..count {
        let x = (i % 32) as f32 * 24.0;
        let y = (i / 32) as f32 * 24.0;
        let shape = match i % 3 {
            0 => commands.circle(&xform, Point::new(x + 10.0, y + 10.0), 9.0),
            1 => commands.rounded_rect_varying(
                &xform,
                Rect::new(x, y, 20.0, 20.0),
                CornerRadius {
                    top_left: 2.0,
                    top_right: 6.0,
                    bottom_right: 2.0,
                    bottom_left: 6.0,
                },
            ),
            _ => commands.rect(&xform, Rect::new(x, y, 20.0, 20.0)),
        };
        shape.expect("append shape");
    }
}

fn build_wave(commands: &mut CommandBuffer) {
    let xform = Affine2D::IDENTITY;
    commands
        .move_to(&xform, Point::new(0.0, 100.0))
        .expect("move");
    for i in 0..200 {
        let x = i as f32 * 10.0;
        commands
            .bezier_to(
                &xform,
                Point::new(x + 3.0, 40.0),
                Point::new(x + 7.0, 160.0),
                Point::new(x + 10.0, 100.0),
            )
            .expect("curve");
    }
}

fn bench_fill(c: &mut Criterion) {
    let mut commands = CommandBuffer::new();
    build_shapes(&mut commands, 1_000);
    let mut cache = PathCache::new();

    c.bench_function("fill_1000_shapes", |b| {
        b.iter(|| {
            cache.clear();
            flatten(&mut cache, &commands, Tolerance::default()).expect("flatten");
            expand_fill(&mut cache, 1.0).expect("fill");
            black_box(cache.vertices().len());
        })
    });
}

fn bench_stroke(c: &mut Criterion) {
    let mut commands = CommandBuffer::new();
    build_wave(&mut commands);
    let mut cache = PathCache::new();
    let style = StrokeStyle {
        half_width: 2.0,
        fringe: 1.0,
        cap: LineCap::Round,
        join: LineJoin::Round,
        miter_limit: 10.0,
    };

    c.bench_function("stroke_wave_round_joins", |b| {
        b.iter(|| {
            cache.clear();
            flatten(&mut cache, &commands, Tolerance::default()).expect("flatten");
            expand_stroke(&mut cache, &style, 0.25).expect("stroke");
            black_box(cache.vertices().len());
        })
    });
}

criterion_group!(tessellate_benches, bench_fill, bench_stroke);
criterion_main!(tessellate_benches);
