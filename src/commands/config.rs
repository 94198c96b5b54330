// Copyright 2025 Muvon Un Limited
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

// Configuration command

use anyhow::Result;
use clap::Args;

use decimind::config::Config;
use decimind::directories;

#[derive(Args, Debug)]
pub struct ConfigArgs {
	/// Write the current configuration to the config file
	#[arg(long)]
	pub init: bool,
}

pub fn run(args: &ConfigArgs, config: &Config) -> Result<()> {
	if args.init {
		config.save()?;
		println!(
			"Configuration written to {}",
			directories::get_config_file_path()?.display()
		);
		return Ok(());
	}

	print!("{}", config.to_display_string()?);
	Ok(())
}
