use super::*;
use crate::composition::model::{LayerContent, PageClip, Placement, VisualLayer};
use crate::encode::sink::InMemorySink;
use crate::foundation::core::{Canvas, Point, Rgba8};

fn clip(page: u32, duration: f64) -> PageClip {
    let canvas = Canvas::new(4, 4).unwrap();
    PageClip::new(
        canvas,
        duration,
        page,
        vec![VisualLayer {
            content: LayerContent::Solid(Rgba8::WHITE),
            placement: Placement::Fixed(Point::ORIGIN),
            size: canvas.size(),
            start: 0.0,
            duration,
            fade_in: 0.0,
        }],
    )
    .unwrap()
}

/// Records `(page, local_t)` per call and encodes the page number in the first byte.
#[derive(Default)]
struct Recorder {
    calls: Vec<(u32, f64)>,
    releases: usize,
}

impl RenderBackend for Recorder {
    fn render_page(&mut self, clip: &PageClip, local_t: f64) -> ShortsResult<FrameRGBA> {
        self.calls.push((clip.page_number, local_t));
        let mut data = vec![0u8; (clip.canvas.width * clip.canvas.height * 4) as usize];
        data[0] = clip.page_number as u8;
        Ok(FrameRGBA {
            width: clip.canvas.width,
            height: clip.canvas.height,
            data,
            premultiplied: true,
        })
    }

    fn release_page(&mut self) {
        self.releases += 1;
    }
}

#[test]
fn frame_count_is_ceil_of_total_times_fps() {
    let tl = Timeline::assemble(vec![clip(1, 1.0), clip(2, 0.55)]).unwrap();
    let fps = Fps::new(10, 1).unwrap();
    let mut backend = Recorder::default();
    let mut sink = InMemorySink::new();

    let stats = render_timeline(&tl, fps, &mut backend, &mut sink, None).unwrap();
    assert_eq!(stats.frames_total, 16);
    assert_eq!(stats.pages_rendered, 2);
    assert_eq!(sink.frames().len(), 16);

    let cfg = sink.config().unwrap();
    assert_eq!((cfg.width, cfg.height), (4, 4));
    assert!(cfg.audio.is_none());
}

#[test]
fn frames_sample_pages_in_order_with_local_time() {
    let tl = Timeline::assemble(vec![clip(1, 1.0), clip(2, 1.0)]).unwrap();
    let fps = Fps::new(4, 1).unwrap();
    let mut backend = Recorder::default();
    let mut sink = InMemorySink::new();
    render_timeline(&tl, fps, &mut backend, &mut sink, None).unwrap();

    let pages: Vec<u32> = backend.calls.iter().map(|c| c.0).collect();
    assert_eq!(pages, vec![1, 1, 1, 1, 2, 2, 2, 2]);
    assert!((backend.calls[5].1 - 0.25).abs() < 1e-9);

    for (i, (idx, frame)) in sink.frames().iter().enumerate() {
        assert_eq!(idx.0, i as u64);
        assert_eq!(frame.data[0], if i < 4 { 1 } else { 2 });
    }
}

#[test]
fn page_resources_are_released_on_every_page_change() {
    let tl = Timeline::assemble(vec![clip(1, 0.5), clip(2, 0.5), clip(3, 0.5)]).unwrap();
    let fps = Fps::new(10, 1).unwrap();
    let mut backend = Recorder::default();
    let mut sink = InMemorySink::new();
    render_timeline(&tl, fps, &mut backend, &mut sink, None).unwrap();
    // once before each page and once after the last frame
    assert_eq!(backend.releases, 4);
}

#[test]
fn audio_input_is_forwarded_to_the_sink() {
    let tl = Timeline::assemble(vec![clip(1, 0.2)]).unwrap();
    let fps = Fps::new(10, 1).unwrap();
    let audio = AudioInputConfig {
        path: "mix.f32le".into(),
        sample_rate: 48_000,
        channels: 2,
    };
    let mut sink = InMemorySink::new();
    render_timeline(&tl, fps, &mut Recorder::default(), &mut sink, Some(audio)).unwrap();
    let cfg = sink.config().unwrap();
    assert_eq!(cfg.audio.unwrap().sample_rate, 48_000);
}

#[test]
fn single_frame_lookup_uses_absolute_time() {
    let tl = Timeline::assemble(vec![clip(1, 1.0), clip(2, 1.0)]).unwrap();
    let mut backend = Recorder::default();
    let frame = render_frame_at(&tl, 1.5, &mut backend).unwrap();
    assert_eq!(frame.data[0], 2);
    assert!((backend.calls[0].1 - 0.5).abs() < 1e-9);
}
