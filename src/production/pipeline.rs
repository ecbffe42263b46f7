use std::path::{Path, PathBuf};

use crate::{
    assets::{fonts::CaptionFont, media::MIX_SAMPLE_RATE},
    audio::mix::{AudioMixer, AudioTrack, write_mix_to_f32le_file},
    composition::{compositor::PageCompositor, model::PageRecord, timeline::Timeline},
    config::Config,
    encode::{
        ffmpeg::{FfmpegSink, FfmpegSinkOpts},
        sink::{AudioInputConfig, FrameSink},
    },
    foundation::error::{ShortsError, ShortsResult},
    production::{script::Script, workspace::TempWorkspace},
    render::{
        backend::FrameRGBA,
        cpu::CpuRenderer,
        pipeline::{RenderStats, render_frame_at, render_timeline},
    },
    services::{
        image::{FluxImageGenerator, ImageSource, PlaceholderImage},
        speech::{SpeechSource, VoicevoxSynthesizer},
        translate::{Passthrough, Translator, translate_or_original, translator_from_config},
        upload::{Uploader, VideoMetadata, watch_url},
    },
    text::{estimate::DurationEstimator, markup::plain_text},
};

/// Outcome of a full production run.
#[derive(Clone, Debug, PartialEq)]
pub struct ProductionReport {
    pub video_path: PathBuf,
    /// Pages in the script.
    pub pages_in_script: usize,
    /// Pages that made it onto the timeline.
    pub pages_rendered: usize,
    pub total_secs: f64,
    pub frames: u64,
    /// Uploaded video id, when an upload succeeded.
    pub video_id: Option<String>,
}

/// `shorts_<N>pages_<floor(total)>s.mp4`.
pub fn output_file_name(pages: usize, total_secs: f64) -> String {
    format!("shorts_{pages}pages_{}s.mp4", total_secs.max(0.0).floor() as u64)
}

/// Timeline plus the narration placed on it.
pub struct AssembledShort {
    pub timeline: Timeline,
    pub narration: Vec<AudioTrack>,
}

/// Script-to-video orchestrator.
///
/// Pages are processed strictly in order. Every collaborator failure is converted into the next
/// rung of its fallback ladder: image provider, then placeholder, then no image; narration, then
/// the duration estimate with no audio. Only an empty timeline or a failed encode ends a run.
pub struct ShortsPipeline {
    config: Config,
    estimator: DurationEstimator,
    translator: Box<dyn Translator>,
    image_sources: Vec<Box<dyn ImageSource>>,
    speech: Option<Box<dyn SpeechSource>>,
    uploader: Option<Box<dyn Uploader>>,
}

impl ShortsPipeline {
    /// Pipeline with no collaborators: no images, estimated durations, untranslated prompts.
    pub fn new(config: Config) -> ShortsResult<Self> {
        config.validate()?;
        let estimator = DurationEstimator::new(config.apis.voicevox.speed_scale)?;
        Ok(Self {
            config,
            estimator,
            translator: Box::new(Passthrough),
            image_sources: Vec::new(),
            speech: None,
            uploader: None,
        })
    }

    /// Wire the network collaborators described by `config`.
    ///
    /// The VOICEVOX engine is probed once; when unreachable every page uses the estimate.
    pub fn from_config(config: Config) -> ShortsResult<Self> {
        let mut pipeline = Self::new(config)?;
        let cfg = &pipeline.config;

        let translator = translator_from_config(&cfg.apis.deepl)?;

        let mut images: Vec<Box<dyn ImageSource>> = Vec::new();
        if cfg.apis.flux.api_key.is_empty() {
            tracing::warn!("Flux API key not configured, pages get placeholder images");
        } else {
            match FluxImageGenerator::new(&cfg.apis.flux) {
                Ok(g) => images.push(Box::new(g)),
                Err(e) => tracing::warn!("image generator disabled: {e}"),
            }
        }
        images.push(Box::new(PlaceholderImage {
            width: cfg.video.width,
            height: cfg.video.height,
        }));

        let voicevox = VoicevoxSynthesizer::new(&cfg.apis.voicevox)?;
        let speech: Option<Box<dyn SpeechSource>> = match voicevox.version() {
            Ok(version) => {
                tracing::info!(url = voicevox.base_url(), version = %version.trim(), "VOICEVOX connected");
                Some(Box::new(voicevox))
            }
            Err(e) => {
                tracing::warn!(url = voicevox.base_url(), "VOICEVOX unreachable, narration durations will be estimated: {e}");
                None
            }
        };

        pipeline.translator = translator;
        pipeline.image_sources = images;
        pipeline.speech = speech;
        Ok(pipeline)
    }

    pub fn with_translator(mut self, translator: Box<dyn Translator>) -> Self {
        self.translator = translator;
        self
    }

    /// Append a rung to the image ladder.
    pub fn with_image_source(mut self, source: Box<dyn ImageSource>) -> Self {
        self.image_sources.push(source);
        self
    }

    pub fn with_speech(mut self, speech: Box<dyn SpeechSource>) -> Self {
        self.speech = Some(speech);
        self
    }

    pub fn with_uploader(mut self, uploader: Box<dyn Uploader>) -> Self {
        self.uploader = Some(uploader);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn compositor(&self) -> ShortsResult<PageCompositor> {
        Ok(
            PageCompositor::new(self.config.canvas()?, self.config.text.colors.clone())
                .with_caption_fade_in(self.config.caption_fade_in_secs()),
        )
    }

    fn generate_image(&self, page_number: u32, prompt: &str, dest: &Path) -> Option<PathBuf> {
        for source in &self.image_sources {
            match source.generate(prompt, dest) {
                Ok(()) => return Some(dest.to_path_buf()),
                Err(e) => tracing::warn!(page = page_number, "image source failed: {e}"),
            }
        }
        if !self.image_sources.is_empty() {
            tracing::warn!(page = page_number, "no image for page, rendering caption only");
        }
        None
    }

    fn narrate(&self, page_number: u32, spoken: &str, dest: &Path) -> (Option<PathBuf>, f64) {
        if let Some(speech) = self.speech.as_ref() {
            match speech.synthesize(spoken, dest) {
                Ok(n) if n.duration_secs.is_finite() && n.duration_secs > 0.0 => {
                    return (Some(n.path), n.duration_secs);
                }
                Ok(n) => tracing::warn!(
                    page = page_number,
                    duration_secs = n.duration_secs,
                    "narration has no usable length, estimating duration"
                ),
                Err(e) => tracing::warn!(page = page_number, "speech synthesis failed, estimating duration: {e}"),
            }
        }
        (None, self.estimator.estimate(spoken))
    }

    /// Run the collaborators for one page and build its record.
    #[tracing::instrument(skip(self, text, ws))]
    pub fn prepare_page(
        &self,
        page_number: u32,
        text: &str,
        ws: &TempWorkspace,
    ) -> ShortsResult<PageRecord> {
        let spoken = plain_text(text);

        let image = if self.image_sources.is_empty() {
            None
        } else {
            let prompt = translate_or_original(self.translator.as_ref(), &spoken);
            tracing::info!(page = page_number, %prompt, "image prompt");
            self.generate_image(page_number, &prompt, &ws.image_path(page_number))
        };

        let (audio, narration_secs) = self.narrate(page_number, &spoken, &ws.audio_path(page_number));
        let duration = self.config.simple_mode.page_duration(narration_secs);

        let mut record = PageRecord::new(page_number, text, duration)?
            .with_style(self.config.text.default_size, self.config.text.colors.default);
        if let Some(path) = image {
            record = record.with_image(path);
        }
        if let Some(path) = audio {
            record = record.with_audio(path);
        }
        tracing::info!(page = page_number, duration, "page prepared");
        Ok(record)
    }

    /// Prepare every page in order. A page whose record cannot be built is skipped with a
    /// warning; the result is empty only if every page failed.
    pub fn prepare_pages(&self, script: &Script, ws: &TempWorkspace) -> Vec<PageRecord> {
        let total = script.pages.len();
        script
            .pages
            .iter()
            .zip(1u32..)
            .filter_map(|(text, n)| {
                tracing::info!("processing page {n}/{total}");
                match self.prepare_page(n, text, ws) {
                    Ok(record) => Some(record),
                    Err(e) => {
                        tracing::warn!(page = n, "skipping page: {e}");
                        None
                    }
                }
            })
            .collect()
    }

    /// Compose every page, drop the ones that fail, and place narration at each kept page's
    /// start.
    pub fn assemble(&self, records: &[PageRecord]) -> ShortsResult<AssembledShort> {
        let compositor = self.compositor()?;
        let mut clips = Vec::with_capacity(records.len());
        let mut narration = Vec::new();
        let mut cursor = 0.0;

        for record in records {
            let clip = match compositor.compose(record) {
                Ok(clip) => clip,
                Err(e) => {
                    tracing::warn!(page = record.page_number, "dropping page: {e}");
                    continue;
                }
            };
            if let Some(path) = record.audio_path.as_deref() {
                match AudioTrack::load(path, cursor, MIX_SAMPLE_RATE) {
                    Ok(track) => narration.push(track),
                    Err(e) => tracing::warn!(page = record.page_number, "narration unavailable, page stays silent: {e}"),
                }
            }
            cursor += clip.duration;
            clips.push(clip);
        }

        Ok(AssembledShort {
            timeline: Timeline::assemble(clips)?,
            narration,
        })
    }

    fn caption_font(&self, timeline: &Timeline) -> ShortsResult<Option<CaptionFont>> {
        let has_text = timeline
            .entries()
            .iter()
            .any(|e| e.clip.text_layers().next().is_some());
        match CaptionFont::resolve(self.config.text.font_path.as_deref()) {
            Ok(font) => Ok(Some(font)),
            Err(e) if !has_text => {
                tracing::debug!("no caption font, none needed: {e}");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Mix the soundtrack into the workspace and stream every frame into `sink`.
    pub fn render_into(
        &self,
        short: &AssembledShort,
        ws: &TempWorkspace,
        sink: &mut dyn FrameSink,
    ) -> ShortsResult<RenderStats> {
        let timeline = &short.timeline;
        let total = timeline.total_duration();

        let mix = AudioMixer::from_config(&self.config.audio).mix(&short.narration, total);
        let mix_path = ws.mix_path();
        write_mix_to_f32le_file(&mix.interleaved_f32, &mix_path)?;
        let audio = AudioInputConfig {
            path: mix_path,
            sample_rate: mix.sample_rate,
            channels: mix.channels,
        };

        let mut backend = CpuRenderer::new(timeline.canvas(), self.caption_font(timeline)?)?;
        render_timeline(timeline, self.config.fps()?, &mut backend, sink, Some(audio))
    }

    /// Script in, MP4 out (and optionally uploaded).
    #[tracing::instrument(skip_all, fields(script = %script.stem, pages = script.pages.len()))]
    pub fn run(&self, script: &Script) -> ShortsResult<ProductionReport> {
        let out_cfg = &self.config.output;
        let ws = TempWorkspace::create(&out_cfg.temp_directory, out_cfg.keep_temp_files)?;

        let records = self.prepare_pages(script, &ws);
        let short = self.assemble(&records)?;
        let pages_rendered = short.timeline.entries().len();
        let total_secs = short.timeline.total_duration();
        if pages_rendered < script.pages.len() {
            tracing::warn!(
                dropped = script.pages.len() - pages_rendered,
                "some pages were dropped from the video"
            );
        }

        let video_path = out_cfg
            .directory
            .join(output_file_name(pages_rendered, total_secs));
        tracing::info!(total_secs, out = %video_path.display(), "rendering video");
        let mut sink = FfmpegSink::new(
            FfmpegSinkOpts::new(&video_path).with_codec(self.config.video.codec.clone()),
        );
        let stats = self.render_into(&short, &ws, &mut sink)?;

        let video_id = self.uploader.as_ref().and_then(|uploader| {
            let meta = VideoMetadata::for_short(
                &script.stem,
                pages_rendered,
                total_secs,
                &self.config.youtube,
            );
            match uploader.upload(&video_path, &meta) {
                Ok(id) => {
                    tracing::info!(url = %watch_url(&id), "uploaded");
                    Some(id)
                }
                Err(e) => {
                    tracing::warn!("upload failed: {e}");
                    None
                }
            }
        });

        Ok(ProductionReport {
            video_path,
            pages_in_script: script.pages.len(),
            pages_rendered,
            total_secs,
            frames: stats.frames_total,
            video_id,
        })
    }

    /// Compose one page from assets already on disk and render it at page-local `at` seconds.
    pub fn preview_page(
        &self,
        page_number: u32,
        text: &str,
        image: Option<&Path>,
        at: f64,
    ) -> ShortsResult<FrameRGBA> {
        if !(at.is_finite() && at >= 0.0) {
            return Err(ShortsError::validation("preview time must be >= 0"));
        }
        let spoken = plain_text(text);
        let duration = self
            .config
            .simple_mode
            .page_duration(self.estimator.estimate(&spoken));
        let mut record = PageRecord::new(page_number, text, duration)?
            .with_style(self.config.text.default_size, self.config.text.colors.default);
        if let Some(path) = image {
            record = record.with_image(path);
        }
        let clip = self.compositor()?.compose(&record)?;
        let timeline = Timeline::assemble(vec![clip])?;
        let mut backend = CpuRenderer::new(timeline.canvas(), self.caption_font(&timeline)?)?;
        render_frame_at(&timeline, at.min(duration), &mut backend)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/production/pipeline.rs"]
mod tests;
