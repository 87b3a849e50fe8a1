//! Canvas rendering for the mood scene.
//!
//! Drawing uses three passes back to front:
//! 1. Mood-tinted background wash (radial gradient)
//! 2. Star layer and meteors
//! 3. Emotion particles with a size-proportional glow

use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::cosmos::StarField;
use super::emotion::Emotion;
use super::particles::ParticleField;
use super::style::{Color, style_for};

/// Deep-space base color behind everything.
const SPACE: Color = Color::rgb(5, 6, 15);

/// Renders the complete scene to the canvas.
pub fn render(
	ctx: &CanvasRenderingContext2d,
	width: f64,
	height: f64,
	stars: &StarField,
	field: &ParticleField,
	from_mood: Emotion,
	to_mood: Emotion,
	blend: f64,
) {
	draw_background(ctx, width, height, from_mood, to_mood, blend);
	draw_stars(ctx, stars);
	draw_meteors(ctx, stars);
	draw_particles(ctx, field);
}

fn draw_background(
	ctx: &CanvasRenderingContext2d,
	width: f64,
	height: f64,
	from_mood: Emotion,
	to_mood: Emotion,
	blend: f64,
) {
	let wash = style_for(from_mood).wash.lerp(style_for(to_mood).wash, blend);

	let gradient = ctx
		.create_radial_gradient(
			width / 2.0,
			height / 2.0,
			0.0,
			width / 2.0,
			height / 2.0,
			(width.max(height)) * 0.8,
		)
		.unwrap();

	gradient.add_color_stop(0.0, &wash.to_css()).unwrap();
	gradient.add_color_stop(1.0, &SPACE.to_css()).unwrap();

	#[allow(deprecated)]
	ctx.set_fill_style(&gradient);
	ctx.fill_rect(0.0, 0.0, width, height);
}

fn draw_stars(ctx: &CanvasRenderingContext2d, stars: &StarField) {
	let color = stars.star_color();

	for s in &stars.stars {
		let alpha = stars.twinkle_alpha(s);
		ctx.set_fill_style_str(&format!(
			"rgba({}, {}, {}, {})",
			color.r, color.g, color.b, alpha
		));

		ctx.begin_path();
		let _ = ctx.arc(s.x, s.y, s.size, 0.0, PI * 2.0);
		ctx.fill();
	}
}

fn draw_meteors(ctx: &CanvasRenderingContext2d, stars: &StarField) {
	for m in &stars.meteors {
		// Trail points back along the travel direction.
		let trail = 0.12;
		let (tx, ty) = (m.x - m.vx * trail, m.y - m.vy * trail);

		ctx.set_stroke_style_str(&format!("rgba(255, 255, 255, {})", 0.8 * m.life));
		ctx.set_line_width(1.5);
		ctx.begin_path();
		ctx.move_to(m.x, m.y);
		ctx.line_to(tx, ty);
		ctx.stroke();
	}
}

fn draw_particles(ctx: &CanvasRenderingContext2d, field: &ParticleField) {
	for p in field.particles() {
		let fill = p.color.with_alpha(p.alpha.clamp(0.0, 1.0));
		ctx.set_shadow_color(&p.color.with_alpha(p.alpha * 0.8).to_css());
		ctx.set_shadow_blur(p.size * 3.0);
		ctx.set_fill_style_str(&fill.to_css());

		ctx.begin_path();
		let _ = ctx.arc(p.x, p.y, p.size, 0.0, PI * 2.0);
		ctx.fill();
	}
	ctx.set_shadow_blur(0.0);
}
