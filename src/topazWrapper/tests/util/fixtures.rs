
use indoc::formatdoc;


/// The output folder of the fixture config, relative to the project folder.
pub const OUT: &'static str = "topaz/24jun10a/ribosome-80s/run001";


pub const ALL_STAGES: [&'static str; 6] = [
	"run_preprocess",
	"run_convert",
	"run_split_test_train",
	"run_train",
	"run_extract",
	"run_visualize_picks"
];


/// A complete configuration, rooted at the project folder, with only the named stages switched on.
pub fn config_json(project_dir: impl AsRef<str>, enabled: &[&str]) -> String {

	let toggle = |name: &str| if enabled.contains(&name) { "yes" } else { "no" };

	formatdoc! { r#"
		{{
			"experiment": {{
				"specimen": "ribosome-80s",
				"session": "24jun10a",
				"run": "run001",
				"slabPickRun": "run002"
			}},
			"input": {{
				"base_program_path": "/opt/topaz_wrapper",
				"base_project_path": "{project_dir}",
				"rawdata_images": "{{base_project_path}}/slabpick/{{session}}/{{slabPickRun}}/gallery/*.mrc",
				"rawdata_particles": "{{base_project_path}}/slabpick/{{session}}/{{slabPickRun}}/particles.txt"
			}},
			"output": {{
				"model_file_save_path": "{{base_project_path}}/topaz/{{session}}/{{specimen}}/{{run}}/models",
				"dir": "{{base_project_path}}/topaz/{{session}}/{{specimen}}/{{run}}"
			}},
			"pipeline": {{
				"run_preprocess": "{run_preprocess}",
				"run_convert": "{run_convert}",
				"run_split_test_train": "{run_split_test_train}",
				"run_train": "{run_train}",
				"run_extract": "{run_extract}",
				"run_visualize_picks": "{run_visualize_picks}"
			}},
			"parameters": {{
				"boxSize": 64,
				"downsampling": 2,
				"number_of_held_out_test_images": 30,
				"number_of_predicted_particles": 240,
				"number_workers": 4,
				"train_radius": 3,
				"extract_radius": 14,
				"number_of_images_to_visualize": 2,
				"display_plots": "false",
				"score": 0
			}}
		}}
	"#,
		project_dir = project_dir.as_ref(),
		run_preprocess = toggle("run_preprocess"),
		run_convert = toggle("run_convert"),
		run_split_test_train = toggle("run_split_test_train"),
		run_train = toggle("run_train"),
		run_extract = toggle("run_extract"),
		run_visualize_picks = toggle("run_visualize_picks")
	}
}


pub fn sys_params_toml(topaz: impl AsRef<str>, system: impl AsRef<str>) -> String {
	formatdoc! { r#"
		[file_paths]
		processed_images_path = "/processed/micrographs/"
		processed_images = "/processed/micrographs/*.mrc"
		processed_particles = "/processed/particles.txt"
		train_images = "/processed/image_list_train.txt"
		train_targets = "/processed/particles_train.txt"
		test_images = "/processed/image_list_test.txt"
		test_targets = "/processed/particles_test.txt"
		save_prefix = "/model"
		model_file_path = "/model_training.txt"
		model = "/model_epoch10.sav"
		predicted_particles = "/predicted_particles.txt"
		scripts_path = "/scripts/"

		[parameters]
		verbosity = 0
		system = "{system}"

		[commands]
		topaz = "{topaz}"
		python = "python3"
	"#,
		topaz = topaz.as_ref(),
		system = system.as_ref()
	}
}
