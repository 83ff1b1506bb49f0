use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use paw_scan::{cli, config, error, file_storage, logging, predictor, scanner};
use cli::{Cli, Commands, HistoryAction, ProfileAction};
use config::Config;
use error::{PawScanError, Result};
use file_storage::FileStorage;
use paw_scan_common::{
    display_breed, display_confidence, iso_timestamp, DogProfile, DogProfileStore, HistoryItemView,
    NewScan, PredictionResult, ScanHistoryStore,
};
use std::path::Path;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);
    let config = Config::load()?;

    match cli.command {
        Commands::Predict { path, no_save, json } => {
            let images = scanner::scan_path(&path)?;
            if images.is_empty() {
                return Err(PawScanError::NoImagesFound(path.display().to_string()));
            }

            // 保存する場合のみユーザーIDが必要
            let mut history = if no_save {
                None
            } else {
                let user = config.resolve_user(cli.user.as_deref())?;
                Some((open_history(&config, cli.storage_dir.as_deref())?, user))
            };

            let client = predictor::PredictionClient::new(&config.api_url(), config.timeout_seconds)?;
            if !json {
                println!("🐶 paw-scan - 犬種判定 ({})\n", client.endpoint());
            }

            let mut failures = 0;
            for image in &images {
                let pb = spinner(&format!("{} を判定中...", image.file_name), json);
                let result = client.predict_file(image).await;
                pb.finish_and_clear();

                let prediction = match result {
                    Ok(p) => p,
                    Err(e) => {
                        failures += 1;
                        tracing::error!(file = %image.path.display(), error = %e, "prediction failed");
                        eprintln!("✖ {}: {}", image.file_name, e);
                        continue;
                    }
                };

                if json {
                    println!("{}", serde_json::to_string(&prediction)?);
                } else {
                    print_prediction(&image.file_name, &prediction);
                }

                // 履歴保存の失敗は判定結果の表示を妨げない
                if let Some((store, user)) = history.as_mut() {
                    let saved = image
                        .to_data_url()
                        .map(|data_url| NewScan::from_prediction(data_url, &prediction))
                        .and_then(|scan| store.append(scan, user).map_err(PawScanError::from));
                    match saved {
                        Ok(entry) => tracing::debug!(id = %entry.id, "scan saved to history"),
                        Err(e) => {
                            tracing::error!(error = %e, "failed to save scan history");
                            eprintln!("⚠ 履歴の保存に失敗しました: {}", e);
                        }
                    }
                }
            }

            if !json {
                println!("\n✅ 判定完了 ({}/{}件)", images.len() - failures, images.len());
            }
        }

        Commands::History { action } => {
            let user = config.resolve_user(cli.user.as_deref())?;
            let mut store = open_history(&config, cli.storage_dir.as_deref())?;

            match action {
                HistoryAction::List { limit, json } => {
                    let mut entries = store.list(&user);
                    if let Some(limit) = limit {
                        entries.truncate(limit);
                    }

                    if json {
                        println!("{}", serde_json::to_string_pretty(&entries)?);
                    } else if entries.is_empty() {
                        println!("履歴はありません (ユーザー: {})", user);
                    } else {
                        println!("スキャン履歴 (ユーザー: {}, {}件):", user, store.count(&user));
                        for entry in &entries {
                            print_history_item(&HistoryItemView::from(entry));
                        }
                    }
                }

                HistoryAction::Recent { count } => {
                    let entries = store.recent(&user, count);
                    println!("最近のスキャン (全{}件中):", store.count(&user));
                    for entry in &entries {
                        print_history_item(&HistoryItemView::from(entry));
                    }
                }

                HistoryAction::Add { image, breed, confidence } => {
                    let image_path = Path::new(&image);
                    let image = if image_path.is_file() {
                        scanner::ImageInfo::from_path(image_path).to_data_url()?
                    } else {
                        image
                    };

                    let entry = store.append(NewScan::new(image, breed, confidence), &user)?;
                    println!("✔ 履歴に追加しました: {} ({})", entry.id, display_breed(&entry.predicted_breed));
                }

                HistoryAction::Clear { yes } => {
                    let count = store.count(&user);
                    if count == 0 {
                        println!("履歴はありません (ユーザー: {})", user);
                        return Ok(());
                    }

                    if !yes && !confirm(&format!("ユーザー {} の履歴 {}件を削除しますか?", user, count))? {
                        println!("キャンセルしました");
                        return Ok(());
                    }

                    let removed = store.clear(&user);
                    println!("✔ {}件の履歴を削除しました", removed);
                }

                HistoryAction::Migrate => {
                    let migrated = store.migrate_to_per_user()?;
                    println!("✔ {}件の履歴をユーザー別に移行しました (レイアウト: {})", migrated, store.layout());
                }
            }
        }

        Commands::Profile { action } => {
            let dir = config.storage_dir(cli.storage_dir.as_deref())?;
            let mut store = DogProfileStore::new(FileStorage::open(dir)?);

            match action {
                ProfileAction::Show => match store.load() {
                    Some(profile) => {
                        println!("プロフィール:");
                        println!("  名前: {}", profile.name);
                        println!("  年齢: {}", profile.age);
                        println!("  誕生日: {}", profile.birthday);
                        println!("  登録日時: {}", profile.created_at);
                    }
                    None => println!("プロフィールは未登録です"),
                },

                ProfileAction::Set { name, age, birthday } => {
                    let created_at = store
                        .load()
                        .map(|p| p.created_at)
                        .filter(|c| !c.is_empty())
                        .unwrap_or_else(|| iso_timestamp(chrono::Utc::now()));
                    store.save(&DogProfile { name, age, birthday, created_at })?;
                    println!("✔ プロフィールを保存しました");
                }

                ProfileAction::Clear => {
                    store.clear();
                    println!("✔ プロフィールを削除しました");
                }
            }
        }

        Commands::Config { set_api_url, set_user, show } => {
            let mut config = config;
            let changed = set_api_url.is_some() || set_user.is_some();

            if let Some(url) = set_api_url {
                config.set_api_url(url);
                println!("✔ 推論APIのURLを設定しました");
            }

            if let Some(user) = set_user {
                config.set_default_user(user);
                println!("✔ 既定のユーザーIDを設定しました");
            }

            if changed {
                config.save()?;
            }

            if show || !changed {
                println!("設定:");
                println!("  推論API: {}", config.api_url());
                println!("  ユーザー: {}", config.default_user.as_deref().unwrap_or("未設定"));
                println!("  保存先: {}", config.storage_dir(cli.storage_dir.as_deref())?.display());
                println!("  レイアウト: {}", config.layout);
                match config.storage_quota_bytes {
                    Some(q) => println!("  容量上限: {} bytes", q),
                    None => println!("  容量上限: なし"),
                }
                println!("  タイムアウト: {}秒", config.timeout_seconds);
            }
        }
    }

    Ok(())
}

fn open_history(config: &Config, storage_dir: Option<&Path>) -> Result<ScanHistoryStore<FileStorage>> {
    let dir = config.storage_dir(storage_dir)?;
    let backend = FileStorage::open(dir)?.with_quota(config.storage_quota_bytes);
    Ok(ScanHistoryStore::new(backend, config.layout))
}

fn spinner(message: &str, hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

fn confirm(prompt: &str) -> Result<bool> {
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| PawScanError::Io(std::io::Error::new(std::io::ErrorKind::Other, e.to_string())))
}

fn print_prediction(file_name: &str, prediction: &PredictionResult) {
    println!("📸 {}", file_name);
    println!("  犬種: {}", display_breed(&prediction.predicted_breed));
    println!("  信頼度: {}", display_confidence(prediction.confidence));

    if !prediction.top3.is_empty() {
        println!("  候補:");
        for (rank, candidate) in prediction.top3.iter().enumerate() {
            println!("    {}. {} ({:.2}%)", rank + 1, candidate.breed, candidate.confidence);
        }
    }

    if let Some(info) = &prediction.info {
        if let Some(nature) = &info.nature {
            println!("  性格: {}", nature.joined(", "));
        }
        if let Some(diet) = &info.diet {
            println!("  食事: {}", diet.joined(", "));
        }
        if let Some(tips) = &info.healthcare_tips {
            println!("  健康管理: {}", tips.joined(", "));
        }
    }
    println!();
}

fn print_history_item(item: &HistoryItemView) {
    println!(
        "  {}  {:<24} {:>5}  {}",
        item.date,
        item.breed,
        display_confidence(item.confidence),
        item.id
    );
}
