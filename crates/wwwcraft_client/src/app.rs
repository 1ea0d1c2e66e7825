use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use glam::IVec3;
use tracing::{debug, info, warn};
use wwwcraft_core::events::EventSender;
use wwwcraft_core::jobs::JobSystem;
use wwwcraft_persist::gateway::{load_remote, SaveGateway};
use wwwcraft_persist::remote::RemoteSource;
use wwwcraft_shared::anchor::spawn_point;
use wwwcraft_shared::block::CustomBlock;
use wwwcraft_shared::save::GameSave;

use crate::commands::MenuCommand;
use crate::platform::Platform;
use crate::settings::{parse_fov, parse_music_enabled, parse_render_distance, ClientSettings};
use crate::ui::link_dialog::{DialogOutcome, LinkDialog, PendingLink};
use crate::ui::toast::Toasts;
use crate::ui::{Control, UiSurface, START};
use crate::world::{reconfigure, GameWorld, NoiseSeeds, NEW_WORLD_CAMERA_Y};

const PLAY_LABEL: &str = "Play";
const RESUME_LABEL: &str = "Resume";
const SAVE_LABEL: &str = "Save and Exit";
const LOAD_LABEL: &str = "Load Game";
const MENU_KEY: char = 'e';
const FULLSCREEN_KEY: char = 'f';

/// Everything the menu loop reacts to.
#[derive(Debug)]
pub enum AppEvent {
    Menu(MenuCommand),
    /// The server-hosted default save finished downloading.
    RemoteSave(GameSave),
    /// Print the controller state to the console.
    Status,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuState {
    Start,
    Playing,
    Paused,
}

/// Panel drawn over the menu without changing [`MenuState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    None,
    Settings,
    Features,
}

pub struct MenuController<W, P, U> {
    world: W,
    platform: P,
    ui: U,
    gateway: SaveGateway,
    settings: ClientSettings,
    settings_path: Option<PathBuf>,
    pending_distance: Option<String>,
    state: MenuState,
    overlay: Overlay,
    toasts: Toasts,
    link_dialog: LinkDialog,
    pending_placement: Option<(IVec3, PendingLink)>,
}

impl<W: GameWorld, P: Platform, U: UiSurface> MenuController<W, P, U> {
    pub fn new(
        world: W,
        platform: P,
        ui: U,
        gateway: SaveGateway,
        settings: ClientSettings,
        settings_path: Option<PathBuf>,
    ) -> Self {
        let mut controller = Self {
            world,
            platform,
            ui,
            gateway,
            settings: settings.sanitize(),
            settings_path,
            pending_distance: None,
            state: MenuState::Start,
            overlay: Overlay::None,
            toasts: Toasts::new(),
            link_dialog: LinkDialog::new(),
            pending_placement: None,
        };
        controller.show_start_screen();
        controller.sync_settings_labels();
        controller
    }

    /// Pushes the loaded settings into the world and builds the background terrain.
    pub fn start(&mut self) {
        self.world.set_camera_fov(self.settings.fov as f32);
        self.platform.set_audio_disabled(!self.settings.music_enabled);
        reconfigure(&mut self.world, self.settings.render_distance);
    }

    pub fn state(&self) -> MenuState {
        self.state
    }

    pub fn overlay(&self) -> Overlay {
        self.overlay
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn ui(&self) -> &U {
        &self.ui
    }

    pub fn gateway(&self) -> &SaveGateway {
        &self.gateway
    }

    pub fn is_placing_link(&self) -> bool {
        self.pending_placement.is_some()
    }

    pub fn handle(&mut self, command: MenuCommand, now: Instant) {
        debug!("Menu command {command:?} in state {:?}", self.state);
        match command {
            MenuCommand::PrimaryAction => self.primary_action(),
            MenuCommand::SaveOrLoad => match self.state {
                MenuState::Start => {
                    let save = self.gateway.load_local();
                    self.load_save(save, now);
                }
                MenuState::Playing | MenuState::Paused => self.save_and_exit(now),
            },
            MenuCommand::Exit => self.exit(),
            MenuCommand::OpenFeatures => self.open_overlay(Overlay::Features),
            MenuCommand::CloseFeatures => self.close_overlay(Overlay::Features),
            MenuCommand::OpenSettings => self.open_overlay(Overlay::Settings),
            MenuCommand::ApplySettings => {
                self.close_overlay(Overlay::Settings);
                self.apply_render_distance();
            }
            MenuCommand::RenderDistanceInput(value) => {
                self.ui
                    .set_text(Control::DistanceLabel, &format!("Render Distance: {value}"));
                self.pending_distance = Some(value);
            }
            MenuCommand::FovInput(value) => self.apply_fov_input(&value),
            MenuCommand::MusicInput(value) => self.apply_music_input(&value),
            MenuCommand::PointerLockChanged(locked) => self.pointer_lock_changed(locked),
            MenuCommand::KeyDown(key) => self.key_down(key),
            MenuCommand::CanvasClick => {
                if self.state != MenuState::Start {
                    self.request_pointer_lock();
                }
            }
            MenuCommand::PlaceLinkBlock(pos) => {
                let pending = self.link_dialog.open(&mut self.ui);
                if let Some((abandoned, _)) = self.pending_placement.replace((pos, pending)) {
                    debug!("Abandoned link placement at {abandoned:?}");
                }
            }
            MenuCommand::LinkKindChanged(kind) => self.link_dialog.select_kind(&mut self.ui, kind),
            MenuCommand::SubmitLink(form) => {
                self.link_dialog.submit(&mut self.ui, form);
                self.collect_link_outcome();
            }
            MenuCommand::CancelLink => {
                self.link_dialog.cancel(&mut self.ui);
                self.collect_link_outcome();
            }
        }
    }

    /// Applies the server-hosted save if the player is still on the start screen.
    pub fn on_remote_save(&mut self, save: GameSave, now: Instant) {
        if self.state != MenuState::Start {
            info!("Ignoring remote save; a game is already running");
            return;
        }
        self.load_save(save, now);
    }

    pub fn update(&mut self, now: Instant) {
        self.toasts.update(&mut self.ui, now);
    }

    pub fn status(&self) -> String {
        let seeds = self.world.seeds();
        let camera = self.world.camera_position();
        let mut out = String::new();
        let _ = writeln!(out, "state: {:?} (overlay: {:?})", self.state, self.overlay);
        let _ = writeln!(
            out,
            "seeds: terrain {:.6} stone {:.6} tree {:.6} coal {:.6} leaf {:.6}",
            seeds.terrain, seeds.stone, seeds.tree, seeds.coal, seeds.leaf
        );
        let _ = writeln!(out, "custom blocks: {}", self.world.custom_blocks().len());
        let _ = writeln!(out, "camera: ({:.2}, {:.2}, {:.2})", camera.x, camera.y, camera.z);
        let _ = writeln!(
            out,
            "settings: distance {} fov {} music {}",
            self.settings.render_distance,
            self.settings.fov,
            if self.settings.music_enabled { "on" } else { "off" }
        );
        let _ = writeln!(
            out,
            "link dialog open: {}, toast running: {}",
            self.link_dialog.is_open(),
            self.toasts.is_active()
        );
        let _ = write!(out, "pointer locked: {}", self.platform.pointer_locked());
        out
    }

    fn primary_action(&mut self) {
        if self.state == MenuState::Start {
            self.enter_playing();
            self.reset_world();
        }
        self.request_pointer_lock();
    }

    fn reset_world(&mut self) {
        self.world.set_seeds(NoiseSeeds::random());
        self.world.replace_custom_blocks(Vec::new());
        self.world.init_blocks();
        self.world.generate();

        let mut camera = self.world.camera_position();
        camera.y = NEW_WORLD_CAMERA_Y;
        self.world.set_camera_position(camera);
        self.world.set_walking_mode();
        info!("Started a new world");
    }

    fn save_and_exit(&mut self, now: Instant) {
        let save = GameSave::new(
            self.world.seeds().terrain,
            self.world.custom_blocks().to_vec(),
            Some(self.world.camera_position().into()),
        );
        let report = self.gateway.save(&save);
        if !report.is_complete() {
            warn!("Game saved with errors: {report:?}");
        }

        self.exit();
        self.toasts.show(&mut self.ui, Control::SaveToast, now);
    }

    fn load_save(&mut self, save: GameSave, now: Instant) {
        let spawn = spawn_point(&save, &self.platform.url_fragment());

        let mut seeds = self.world.seeds();
        seeds.terrain = save.seed;
        self.world.set_seeds(seeds);
        let block_count = save.blocks.len();
        self.world.replace_custom_blocks(save.blocks);
        self.world.init_blocks();
        self.world.generate();

        if let Some(spawn) = spawn {
            self.world.set_camera_position(spawn.into());
        }

        self.enter_playing();
        self.toasts.show(&mut self.ui, Control::LoadToast, now);
        self.request_pointer_lock();
        info!("Loaded game with {block_count} custom block(s)");
    }

    fn exit(&mut self) {
        if self.state == MenuState::Start {
            debug!("Exit requested on the start screen");
            return;
        }
        if self.platform.pointer_locked() {
            self.platform.release_pointer_lock();
        }
        self.show_start_screen();
    }

    fn pointer_lock_changed(&mut self, locked: bool) {
        if locked {
            self.enter_playing();
            return;
        }
        match self.state {
            MenuState::Playing => self.enter_paused(),
            MenuState::Paused => {}
            MenuState::Start => debug!("Pointer released on the start screen"),
        }
    }

    fn key_down(&mut self, key: char) {
        match key {
            MENU_KEY => {
                if self.platform.pointer_locked() && !self.platform.is_touch_device() {
                    self.platform.release_pointer_lock();
                }
            }
            FULLSCREEN_KEY => {
                let fullscreen = self.platform.is_fullscreen();
                self.platform.set_fullscreen(!fullscreen);
            }
            _ => {}
        }
    }

    fn request_pointer_lock(&mut self) {
        if !self.platform.is_touch_device() {
            self.platform.request_pointer_lock();
        }
    }

    fn enter_playing(&mut self) {
        self.state = MenuState::Playing;
        if self.platform.is_touch_device() {
            self.platform.init_joystick();
        }
        self.ui.set_hidden(Control::Menu, true);
        self.ui.set_class(Control::Menu, START, false);
        self.ui.set_text(Control::PlayButton, RESUME_LABEL);
        self.ui.set_hidden(Control::CrossHair, false);
        self.ui.set_hidden(Control::Github, true);
        self.ui.set_hidden(Control::FeatureButton, true);
    }

    fn enter_paused(&mut self) {
        self.state = MenuState::Paused;
        self.ui.set_hidden(Control::Menu, false);
        self.ui.set_hidden(Control::CrossHair, true);
        self.ui.set_text(Control::SaveButton, SAVE_LABEL);
        self.ui.set_hidden(Control::Github, false);
    }

    fn show_start_screen(&mut self) {
        self.state = MenuState::Start;
        self.ui.set_hidden(Control::Menu, false);
        self.ui.set_class(Control::Menu, START, true);
        self.ui.set_hidden(Control::CrossHair, true);
        self.ui.set_text(Control::PlayButton, PLAY_LABEL);
        self.ui.set_text(Control::SaveButton, LOAD_LABEL);
        self.ui.set_hidden(Control::FeatureButton, false);
    }

    fn open_overlay(&mut self, overlay: Overlay) {
        let Some(panel) = overlay_panel(overlay) else {
            return;
        };
        self.ui.set_hidden(panel, false);
        self.overlay = overlay;
    }

    fn close_overlay(&mut self, overlay: Overlay) {
        let Some(panel) = overlay_panel(overlay) else {
            return;
        };
        self.ui.set_hidden(panel, true);
        if self.overlay == overlay {
            self.overlay = Overlay::None;
        }
    }

    fn apply_render_distance(&mut self) {
        let input = self
            .pending_distance
            .take()
            .unwrap_or_else(|| self.settings.render_distance.to_string());
        let Some(render_distance) = parse_render_distance(&input) else {
            warn!("Ignoring render distance input '{input}'");
            self.sync_settings_labels();
            return;
        };

        self.settings.render_distance = render_distance;
        self.sync_settings_labels();
        reconfigure(&mut self.world, render_distance);
        self.save_settings();
    }

    fn apply_fov_input(&mut self, value: &str) {
        let Some(fov) = parse_fov(value) else {
            warn!("Ignoring field of view input '{value}'");
            return;
        };
        self.settings.fov = fov;
        self.ui
            .set_text(Control::FovLabel, &format!("Field of View: {fov}"));
        self.world.set_camera_fov(fov as f32);
    }

    fn apply_music_input(&mut self, value: &str) {
        let enabled = parse_music_enabled(value);
        self.settings.music_enabled = enabled;
        self.platform.set_audio_disabled(!enabled);
        self.ui.set_text(Control::MusicLabel, music_label(enabled));
    }

    fn sync_settings_labels(&mut self) {
        self.ui.set_text(
            Control::DistanceLabel,
            &format!("Render Distance: {}", self.settings.render_distance),
        );
        self.ui
            .set_text(Control::FovLabel, &format!("Field of View: {}", self.settings.fov));
        self.ui
            .set_text(Control::MusicLabel, music_label(self.settings.music_enabled));
    }

    fn save_settings(&self) {
        let Some(path) = self.settings_path.as_ref() else {
            return;
        };
        if let Err(err) = self.settings.save(path) {
            warn!("Failed to save settings to {}: {err}", path.display());
        }
    }

    fn collect_link_outcome(&mut self) {
        let Some((pos, pending)) = self.pending_placement.take() else {
            return;
        };
        match pending.poll() {
            Some(DialogOutcome::Submitted(attributes)) => {
                self.world.push_custom_block(CustomBlock::new(pos, attributes));
            }
            Some(DialogOutcome::Cancelled) => debug!("Link placement at {pos:?} cancelled"),
            None => self.pending_placement = Some((pos, pending)),
        }
    }
}

fn overlay_panel(overlay: Overlay) -> Option<Control> {
    match overlay {
        Overlay::Settings => Some(Control::SettingsPanel),
        Overlay::Features => Some(Control::FeaturesPanel),
        Overlay::None => None,
    }
}

fn music_label(enabled: bool) -> &'static str {
    if enabled {
        "Music: On"
    } else {
        "Music: Off"
    }
}

/// Fetches the hosted default save on a worker and posts it back to the loop.
pub fn spawn_remote_load(
    jobs: &JobSystem,
    remote: Arc<dyn RemoteSource>,
    events: EventSender<AppEvent>,
) {
    jobs.spawn(move || {
        let Some(save) = load_remote(remote.as_ref()) else {
            return;
        };
        if events.send(AppEvent::RemoteSave(save)).is_err() {
            debug!("Event loop closed before the remote save arrived");
        }
    });
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use glam::{IVec3, Vec3};
    use wwwcraft_core::events::channel;
    use wwwcraft_core::jobs::JobSystem;
    use wwwcraft_persist::download::RecordedDownloads;
    use wwwcraft_persist::gateway::SaveGateway;
    use wwwcraft_persist::remote::RemoteSource;
    use wwwcraft_persist::store::{KeyValueStore, MemoryStore};
    use wwwcraft_shared::block::{BlockAttributes, CustomBlock};
    use wwwcraft_shared::save::{GameSave, SavedPosition, SAVE_STORAGE_KEY};

    use super::{spawn_remote_load, AppEvent, MenuController, MenuState, Overlay};
    use crate::commands::MenuCommand;
    use crate::platform::Platform;
    use crate::settings::ClientSettings;
    use crate::ui::link_dialog::LinkForm;
    use crate::ui::{ConsoleUi, Control, SHOW};
    use crate::world::{GameWorld, HeadlessWorld};

    #[derive(Debug, Default)]
    struct TestPlatform {
        touch: bool,
        fragment: String,
        locked: bool,
        lock_requests: u32,
        fullscreen: bool,
        audio_disabled: bool,
        joystick_ready: bool,
    }

    impl Platform for TestPlatform {
        fn is_touch_device(&self) -> bool {
            self.touch
        }
        fn request_pointer_lock(&mut self) {
            self.lock_requests += 1;
            self.locked = true;
        }
        fn release_pointer_lock(&mut self) {
            self.locked = false;
        }
        fn pointer_locked(&self) -> bool {
            self.locked
        }
        fn is_fullscreen(&self) -> bool {
            self.fullscreen
        }
        fn set_fullscreen(&mut self, fullscreen: bool) {
            self.fullscreen = fullscreen;
        }
        fn set_audio_disabled(&mut self, disabled: bool) {
            self.audio_disabled = disabled;
        }
        fn init_joystick(&mut self) {
            self.joystick_ready = true;
        }
        fn url_fragment(&self) -> String {
            self.fragment.clone()
        }
    }

    type TestController = MenuController<HeadlessWorld, TestPlatform, ConsoleUi>;

    fn controller_with(platform: TestPlatform, store: MemoryStore, ui: ConsoleUi) -> TestController {
        let gateway = SaveGateway::new(Box::new(store), Box::new(RecordedDownloads::default()));
        MenuController::new(
            HeadlessWorld::new(16),
            platform,
            ui,
            gateway,
            ClientSettings::default(),
            None,
        )
    }

    fn controller() -> TestController {
        controller_with(TestPlatform::default(), MemoryStore::new(), ConsoleUi::new())
    }

    fn store_with(save: &GameSave) -> MemoryStore {
        let mut store = MemoryStore::new();
        store
            .set_item(SAVE_STORAGE_KEY, &save.encode().expect("encode save"))
            .expect("seed store");
        store
    }

    fn anchored_save() -> GameSave {
        GameSave::new(
            0.625,
            vec![
                CustomBlock::anchor(IVec3::new(1, 2, 3), "home"),
                CustomBlock::anchor(IVec3::new(9, 9, 9), "home"),
            ],
            Some(SavedPosition::new(20.0, 45.0, -8.0)),
        )
    }

    fn play(controller: &mut TestController, now: Instant) {
        controller.handle(MenuCommand::PrimaryAction, now);
        controller.handle(MenuCommand::PointerLockChanged(true), now);
    }

    fn pause(controller: &mut TestController, now: Instant) {
        controller.handle(MenuCommand::KeyDown('e'), now);
        controller.handle(MenuCommand::PointerLockChanged(false), now);
    }

    #[test]
    fn starts_on_start_screen() {
        let controller = controller();
        assert_eq!(controller.state(), MenuState::Start);
        assert_eq!(controller.overlay(), Overlay::None);
        assert!(controller.ui().has_class(Control::Menu, "start"));
        assert_eq!(controller.ui().text(Control::PlayButton), Some("Play"));
        assert_eq!(controller.ui().text(Control::SaveButton), Some("Load Game"));
        assert_eq!(
            controller.ui().text(Control::DistanceLabel),
            Some("Render Distance: 3")
        );
    }

    #[test]
    fn play_resets_every_seed_and_requests_capture() {
        let mut controller = controller();
        let before = controller.world().seeds();
        let now = Instant::now();

        controller.handle(MenuCommand::PrimaryAction, now);

        let after = controller.world().seeds();
        assert_ne!(before.terrain, after.terrain);
        assert_ne!(before.stone, after.stone);
        assert_ne!(before.tree, after.tree);
        assert_ne!(before.coal, after.coal);
        assert_ne!(before.leaf, after.leaf);
        assert_eq!(controller.state(), MenuState::Playing);
        assert!(controller.world().custom_blocks().is_empty());
        assert_eq!(controller.world().camera_position().y, 40.0);
        assert!(controller.world().walking);
        assert_eq!(controller.world().generations, 1);
        assert_eq!(controller.platform().lock_requests, 1);
        assert!(controller.ui().is_hidden(Control::Menu));
        assert!(!controller.ui().has_class(Control::Menu, "start"));
        assert_eq!(controller.ui().text(Control::PlayButton), Some("Resume"));
        assert!(!controller.ui().is_hidden(Control::CrossHair));
    }

    #[test]
    fn touch_devices_skip_capture_and_get_a_joystick() {
        let platform = TestPlatform {
            touch: true,
            ..TestPlatform::default()
        };
        let mut controller = controller_with(platform, MemoryStore::new(), ConsoleUi::new());

        controller.handle(MenuCommand::PrimaryAction, Instant::now());
        assert_eq!(controller.state(), MenuState::Playing);
        assert_eq!(controller.platform().lock_requests, 0);
        assert!(controller.platform().joystick_ready);
    }

    #[test]
    fn pointer_capture_drives_pause_and_resume() {
        let mut controller = controller();
        let now = Instant::now();
        play(&mut controller, now);

        pause(&mut controller, now);
        assert_eq!(controller.state(), MenuState::Paused);
        assert!(!controller.ui().is_hidden(Control::Menu));
        assert!(controller.ui().is_hidden(Control::CrossHair));
        assert_eq!(controller.ui().text(Control::SaveButton), Some("Save and Exit"));

        controller.handle(MenuCommand::PrimaryAction, now);
        assert_eq!(controller.world().generations, 1, "resume must not reset the world");
        controller.handle(MenuCommand::PointerLockChanged(true), now);
        assert_eq!(controller.state(), MenuState::Playing);
    }

    #[test]
    fn release_on_start_screen_keeps_start_screen() {
        let mut controller = controller();
        controller.handle(MenuCommand::PointerLockChanged(false), Instant::now());
        assert_eq!(controller.state(), MenuState::Start);
        assert_eq!(controller.ui().text(Control::SaveButton), Some("Load Game"));
    }

    #[test]
    fn exit_returns_to_start_without_touching_saved_data() {
        let saved = anchored_save();
        let mut controller =
            controller_with(TestPlatform::default(), store_with(&saved), ConsoleUi::new());
        let now = Instant::now();
        play(&mut controller, now);
        pause(&mut controller, now);

        controller.handle(MenuCommand::Exit, now);
        assert_eq!(controller.state(), MenuState::Start);
        assert_eq!(controller.ui().text(Control::PlayButton), Some("Play"));
        assert_eq!(controller.ui().text(Control::SaveButton), Some("Load Game"));
        assert!(!controller.ui().is_hidden(Control::FeatureButton));
        assert_eq!(controller.gateway().load_local(), saved);
    }

    #[test]
    fn exit_while_playing_restores_menu_and_keeps_saved_data() {
        let saved = anchored_save();
        let mut controller =
            controller_with(TestPlatform::default(), store_with(&saved), ConsoleUi::new());
        let now = Instant::now();
        play(&mut controller, now);
        assert!(controller.platform().locked);
        assert!(controller.ui().is_hidden(Control::Menu));

        controller.handle(MenuCommand::Exit, now);
        assert_eq!(controller.state(), MenuState::Start);
        assert!(!controller.ui().is_hidden(Control::Menu));
        assert!(controller.ui().has_class(Control::Menu, "start"));
        assert!(controller.ui().is_hidden(Control::CrossHair));
        assert!(!controller.platform().locked);
        assert_eq!(controller.gateway().load_local(), saved);

        controller.handle(MenuCommand::PointerLockChanged(false), now);
        assert_eq!(controller.state(), MenuState::Start);
    }

    #[test]
    fn save_and_exit_persists_world_and_shows_toast() {
        let mut controller = controller();
        let now = Instant::now();
        play(&mut controller, now);
        controller.handle(MenuCommand::PlaceLinkBlock(IVec3::new(4, 5, 6)), now);
        controller.handle(MenuCommand::SubmitLink(LinkForm::anchor("spawn")), now);
        pause(&mut controller, now);

        controller.handle(MenuCommand::SaveOrLoad, now);
        assert_eq!(controller.state(), MenuState::Start);
        assert!(!controller.ui().is_hidden(Control::SaveToast));

        let stored = controller.gateway().load_local();
        assert_eq!(stored.seed, controller.world().seeds().terrain);
        assert_eq!(
            stored.blocks,
            vec![CustomBlock::anchor(IVec3::new(4, 5, 6), "spawn")]
        );
        assert_eq!(
            stored.position,
            Some(SavedPosition::from(controller.world().camera_position()))
        );

        controller.update(now);
        assert!(controller.ui().has_class(Control::SaveToast, SHOW));
        controller.update(now + Duration::from_millis(1350));
        assert!(controller.ui().is_hidden(Control::SaveToast));
        assert!(!controller.ui().has_class(Control::SaveToast, SHOW));
    }

    #[test]
    fn load_spawns_on_fragment_anchor() {
        let platform = TestPlatform {
            fragment: "#home".to_string(),
            ..TestPlatform::default()
        };
        let saved = anchored_save();
        let mut controller = controller_with(platform, store_with(&saved), ConsoleUi::new());

        controller.handle(MenuCommand::SaveOrLoad, Instant::now());
        assert_eq!(controller.state(), MenuState::Playing);
        assert_eq!(controller.world().camera_position(), Vec3::new(1.0, 4.0, 3.0));
        assert_eq!(controller.world().seeds().terrain, 0.625);
        assert_eq!(controller.world().custom_blocks(), saved.blocks.as_slice());
        assert!(!controller.ui().is_hidden(Control::LoadToast));
        assert_eq!(controller.platform().lock_requests, 1);
    }

    #[test]
    fn load_without_matching_anchor_uses_saved_position() {
        let platform = TestPlatform {
            fragment: "#nowhere".to_string(),
            ..TestPlatform::default()
        };
        let mut controller =
            controller_with(platform, store_with(&anchored_save()), ConsoleUi::new());

        controller.handle(MenuCommand::SaveOrLoad, Instant::now());
        assert_eq!(controller.world().camera_position(), Vec3::new(20.0, 45.0, -8.0));
    }

    #[test]
    fn load_with_empty_store_keeps_camera() {
        let mut controller = controller();
        let camera = controller.world().camera_position();

        controller.handle(MenuCommand::SaveOrLoad, Instant::now());
        assert_eq!(controller.state(), MenuState::Playing);
        assert_eq!(controller.world().camera_position(), camera);
        assert!(controller.world().custom_blocks().is_empty());
    }

    #[test]
    fn applying_settings_regenerates_with_new_budget() {
        let mut controller = controller();
        let now = Instant::now();
        controller.handle(MenuCommand::OpenSettings, now);
        assert_eq!(controller.overlay(), Overlay::Settings);
        assert!(!controller.ui().is_hidden(Control::SettingsPanel));

        controller.handle(MenuCommand::RenderDistanceInput("4".to_string()), now);
        assert_eq!(
            controller.ui().text(Control::DistanceLabel),
            Some("Render Distance: 4")
        );
        controller.handle(MenuCommand::ApplySettings, now);

        assert_eq!(controller.overlay(), Overlay::None);
        assert!(controller.ui().is_hidden(Control::SettingsPanel));
        assert_eq!(controller.settings().render_distance, 4);
        assert_eq!(controller.world().render_distance, 4);
        assert_eq!(controller.world().max_block_budget, 21236);
        assert_eq!(controller.world().fog.map(|fog| fog.far), Some(120.0));
        assert_eq!(controller.world().generations, 1);
        assert_eq!(controller.state(), MenuState::Start);
    }

    #[test]
    fn invalid_distance_input_keeps_previous_terrain() {
        let mut controller = controller();
        let now = Instant::now();
        controller.handle(MenuCommand::RenderDistanceInput("far".to_string()), now);
        controller.handle(MenuCommand::ApplySettings, now);

        assert_eq!(controller.world().generations, 0);
        assert_eq!(controller.settings().render_distance, 3);
        assert_eq!(
            controller.ui().text(Control::DistanceLabel),
            Some("Render Distance: 3")
        );
    }

    #[test]
    fn fov_and_music_apply_immediately() {
        let mut controller = controller();
        let now = Instant::now();

        controller.handle(MenuCommand::FovInput("90".to_string()), now);
        assert_eq!(controller.world().camera_fov, 90.0);
        assert_eq!(controller.ui().text(Control::FovLabel), Some("Field of View: 90"));

        controller.handle(MenuCommand::FovInput("wide".to_string()), now);
        assert_eq!(controller.world().camera_fov, 90.0);

        controller.handle(MenuCommand::MusicInput("0".to_string()), now);
        assert!(controller.platform().audio_disabled);
        assert_eq!(controller.ui().text(Control::MusicLabel), Some("Music: Off"));
        controller.handle(MenuCommand::MusicInput("1".to_string()), now);
        assert!(!controller.platform().audio_disabled);
        assert_eq!(controller.ui().text(Control::MusicLabel), Some("Music: On"));
    }

    #[test]
    fn keyboard_shortcuts() {
        let mut controller = controller();
        let now = Instant::now();

        controller.handle(MenuCommand::KeyDown('f'), now);
        assert!(controller.platform().fullscreen);
        controller.handle(MenuCommand::KeyDown('f'), now);
        assert!(!controller.platform().fullscreen);

        play(&mut controller, now);
        assert!(controller.platform().locked);
        controller.handle(MenuCommand::KeyDown('e'), now);
        assert!(!controller.platform().locked);
    }

    #[test]
    fn canvas_click_ignored_on_start_screen() {
        let mut controller = controller();
        let now = Instant::now();
        controller.handle(MenuCommand::CanvasClick, now);
        assert_eq!(controller.platform().lock_requests, 0);

        play(&mut controller, now);
        pause(&mut controller, now);
        controller.handle(MenuCommand::CanvasClick, now);
        assert_eq!(controller.platform().lock_requests, 2);
    }

    #[test]
    fn remote_save_only_applies_on_start_screen() {
        let mut controller = controller();
        let now = Instant::now();
        controller.on_remote_save(anchored_save(), now);
        assert_eq!(controller.state(), MenuState::Playing);
        assert_eq!(controller.world().custom_blocks().len(), 2);

        pause(&mut controller, now);
        controller.on_remote_save(GameSave::new(0.9, Vec::new(), None), now);
        assert_eq!(controller.world().custom_blocks().len(), 2);
        assert_eq!(controller.state(), MenuState::Paused);
    }

    #[test]
    fn cancelled_link_placement_adds_nothing() {
        let mut controller = controller();
        let now = Instant::now();
        controller.handle(MenuCommand::PlaceLinkBlock(IVec3::new(0, 1, 0)), now);
        assert!(controller.is_placing_link());

        controller.handle(MenuCommand::CancelLink, now);
        assert!(!controller.is_placing_link());
        controller.handle(
            MenuCommand::SubmitLink(LinkForm::link("https://example.org", "")),
            now,
        );
        assert!(controller.world().custom_blocks().is_empty());
    }

    #[test]
    fn link_submission_places_block_once() {
        let mut controller = controller();
        let now = Instant::now();
        controller.handle(MenuCommand::PlaceLinkBlock(IVec3::new(2, 3, 4)), now);
        controller.handle(
            MenuCommand::SubmitLink(LinkForm::link("https://example.org", "_blank")),
            now,
        );
        controller.handle(MenuCommand::SubmitLink(LinkForm::anchor("dup")), now);

        assert_eq!(
            controller.world().custom_blocks(),
            &[CustomBlock::new(
                IVec3::new(2, 3, 4),
                BlockAttributes::Link {
                    href: "https://example.org".to_string(),
                    target: Some("_blank".to_string()),
                }
            )]
        );
    }

    #[test]
    fn missing_controls_do_not_block_transitions() {
        let ui = ConsoleUi::new()
            .without(Control::Menu)
            .without(Control::Github)
            .without(Control::SaveToast);
        let mut controller = controller_with(TestPlatform::default(), MemoryStore::new(), ui);
        let now = Instant::now();

        play(&mut controller, now);
        pause(&mut controller, now);
        controller.handle(MenuCommand::SaveOrLoad, now);
        controller.update(now + Duration::from_secs(2));
        assert_eq!(controller.state(), MenuState::Start);
        assert!(controller.gateway().load_local().position.is_some());
    }

    struct HostedSave(Vec<u8>);

    impl RemoteSource for HostedSave {
        fn fetch(&self, _path: &str) -> io::Result<Option<Vec<u8>>> {
            Ok(Some(self.0.clone()))
        }
    }

    #[test]
    fn remote_load_posts_back_to_event_loop() {
        let jobs = JobSystem::io().expect("build io pool");
        let (tx, rx) = channel();
        let body = anchored_save().encode().expect("encode").into_bytes();

        spawn_remote_load(&jobs, Arc::new(HostedSave(body)), tx);

        match rx
            .recv_timeout(Duration::from_secs(5))
            .expect("remote save event")
        {
            AppEvent::RemoteSave(save) => assert_eq!(save, anchored_save()),
            other => panic!("unexpected event {other:?}"),
        }
    }
}
