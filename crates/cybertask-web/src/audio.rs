use std::cell::{
  Cell,
  RefCell
};
use std::collections::HashMap;
use std::rc::Rc;

use anyhow::anyhow;
use cybertask_core::audio::{
  CuePlayer,
  cue_config
};
use wasm_bindgen_futures::JsFuture;
use web_sys::HtmlAudioElement;

/// Plays cues through cached `<audio>` elements.
#[derive(Debug, Clone)]
pub struct WebCuePlayer {
  cache:  Rc<RefCell<HashMap<String, HtmlAudioElement>>>,
  volume: Rc<Cell<f64>>
}

impl Default for WebCuePlayer {
  fn default() -> Self {
    Self {
      cache:  Rc::default(),
      volume: Rc::new(Cell::new(1.0))
    }
  }
}

impl WebCuePlayer {
  /// Master volume from 0.0 to 1.0,
  /// applied on top of each cue's own
  /// level.
  pub fn set_volume(
    &self,
    volume: f64
  ) {
    self
      .volume
      .set(volume.clamp(0.0, 1.0));
  }

  fn element(
    &self,
    src: &str
  ) -> anyhow::Result<HtmlAudioElement> {
    if let Some(existing) =
      self.cache.borrow().get(src)
    {
      return Ok(existing.clone());
    }

    let element =
      HtmlAudioElement::new_with_src(src)
        .map_err(|error| {
          anyhow!(
            "failed creating audio for \
             {src}: {error:?}"
          )
        })?;
    self
      .cache
      .borrow_mut()
      .insert(src.to_string(), element.clone());
    Ok(element)
  }
}

impl CuePlayer for WebCuePlayer {
  fn play(
    &self,
    cue: &str
  ) -> anyhow::Result<()> {
    let config = cue_config(cue)
      .ok_or_else(|| {
        anyhow!("unknown sound cue: {cue}")
      })?;
    let element =
      self.element(config.src)?;
    element.set_volume(
      config.volume * self.volume.get()
    );
    let promise =
      element.play().map_err(|error| {
        anyhow!(
          "failed playing {cue}: {error:?}"
        )
      })?;

    // Autoplay policies reject playback
    // until the first user gesture.
    let cue = cue.to_string();
    wasm_bindgen_futures::spawn_local(
      async move {
        if let Err(error) =
          JsFuture::from(promise).await
        {
          tracing::debug!(
            cue = %cue,
            ?error,
            "sound cue playback rejected"
          );
        }
      }
    );
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use cybertask_core::audio::CuePlayer;

  use super::WebCuePlayer;

  #[test]
  fn unknown_cue_fails_before_touching_the_dom()
   {
    let player = WebCuePlayer::default();
    assert!(player.play("kazoo").is_err());
    assert!(player.cache.borrow().is_empty());
  }

  #[test]
  fn master_volume_is_clamped() {
    let player = WebCuePlayer::default();
    player.set_volume(3.0);
    assert_eq!(player.volume.get(), 1.0);
    player.set_volume(-1.0);
    assert_eq!(player.volume.get(), 0.0);
  }
}
