
use galvanic_assert::{assert_that, matchers::*};

use topaz_wrapper::config::Config;
use topaz_wrapper::stages::{Stage, StageContext};
use topaz_wrapper::sysparams::SysParams;

mod util;

use crate::util::fixtures;


const OUT: &'static str = "/data/topaz/24jun10a/ribosome-80s/run001";
const MODELS: &'static str = "/data/topaz/24jun10a/ribosome-80s/run001/models";


fn command(stage: Stage, system: &str) -> String {
	let config = Config::parse(fixtures::config_json("/data", &[]))
		.unwrap();
	let sys = SysParams::parse(fixtures::sys_params_toml("topaz", system))
		.unwrap();
	let ctx = StageContext::new(&config, &sys);
	stage.command(&ctx)
		.unwrap()
}


#[test]
fn order() {
	let ids = Stage::ALL.iter()
		.map(|stage| stage.id())
		.collect::<Vec<_>>();
	assert_that!(&ids, eq(vec![
		"execute_preprocess",
		"execute_convert",
		"execute_train_test_split",
		"execute_train",
		"execute_extract",
		"execute_visualize_picks"
	]));
}


#[test]
fn enabled() {
	let config = Config::parse(fixtures::config_json("/data", &["run_convert", "run_extract"]))
		.unwrap();
	let enabled = Stage::ALL.iter()
		.filter(|stage| stage.enabled(&config.pipeline))
		.copied()
		.collect::<Vec<_>>();
	assert_that!(&enabled, eq(vec![Stage::Convert, Stage::Extract]));
}


#[test]
fn preprocess() {
	assert_that!(&command(Stage::Preprocess, "linux"), eq(format!(
		"topaz preprocess -v -s 2 -o {OUT}/processed/micrographs/ /data/slabpick/24jun10a/run002/gallery/*.mrc"
	)));
}


#[test]
fn convert() {
	assert_that!(&command(Stage::Convert, "linux"), eq(format!(
		"topaz convert -s 2 -o {OUT}/processed/particles.txt /data/slabpick/24jun10a/run002/particles.txt"
	)));
}


#[test]
fn train_test_split() {
	assert_that!(&command(Stage::TrainTestSplit, "linux"), eq(format!(
		"topaz train_test_split -n 30 --image-dir {OUT}/processed/micrographs/ {OUT}/processed/particles.txt"
	)));
}


#[test]
fn train() {
	assert_that!(&command(Stage::Train, "linux"), eq(format!(
		"topaz train -n 240 -r 3 --num-workers=4 \
		--train-images {OUT}/processed/image_list_train.txt \
		--train-targets {OUT}/processed/particles_train.txt \
		--test-images {OUT}/processed/image_list_test.txt \
		--test-targets {OUT}/processed/particles_test.txt \
		--save-prefix {MODELS}/model \
		-o {MODELS}/model_training.txt"
	)));
}


#[test]
fn train_macos() {
	let cmd = command(Stage::Train, "macos");
	assert!(cmd.starts_with("python3 /opt/topaz_wrapper/topaz/topaz/commands/train.py -n 240 "), "unexpected command: {}", cmd);
}


#[test]
fn extract() {
	assert_that!(&command(Stage::Extract, "linux"), eq(format!(
		"topaz extract -r 14 -m {MODELS}/model_epoch10.sav -o {OUT}/predicted_particles.txt {OUT}/processed/micrographs/*.mrc"
	)));
}


#[test]
fn visualize_picks() {
	assert_that!(&command(Stage::VisualizePicks, "linux"), eq(format!(
		"python3 /opt/topaz_wrapper/scripts/visualize_picks.py /opt/topaz_wrapper {OUT} \
		{OUT}/predicted_particles.txt {OUT}/processed/particles.txt {OUT}/processed/micrographs/ \
		{OUT}/processed/image_list_test.txt 14 2 false 0"
	)));
}


#[test]
fn unknown_placeholder_fails_the_command() {
	let json = fixtures::config_json("/data", &[])
		.replace("{base_project_path}/topaz", "{base_project_path}/{volume}");
	let config = Config::parse(json)
		.unwrap();
	let sys = SysParams::parse(fixtures::sys_params_toml("topaz", "linux"))
		.unwrap();
	let ctx = StageContext::new(&config, &sys);
	assert!(Stage::Convert.command(&ctx).is_err());
}
