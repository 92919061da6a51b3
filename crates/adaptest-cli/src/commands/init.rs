//! The `adaptest init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    write_if_missing(Path::new("adaptest.toml"), SAMPLE_CONFIG)?;

    std::fs::create_dir_all("banks")?;
    write_if_missing(Path::new("banks/sample.json"), SAMPLE_BANK)?;

    println!("\nNext steps:");
    println!("  1. Set ANTHROPIC_API_KEY (or edit adaptest.toml) to enable generated questions");
    println!("  2. Run: adaptest validate --bank banks/sample.json");
    println!("  3. Run: adaptest exam --mode offline --count 8");

    Ok(())
}

fn write_if_missing(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, content)?;
        println!("Created {}", path.display());
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# adaptest configuration

default_provider = "anthropic"
default_model = "claude-haiku-4-5-20251001"
temperature = 1.0
max_attempts = 3
retry_delay_ms = 1500
max_tokens = 600

bank = "banks/sample.json"
output_dir = "./adaptest-results"

[providers.anthropic]
type = "anthropic"
api_key = "${ANTHROPIC_API_KEY}"

# [providers.ollama]
# type = "ollama"
# base_url = "http://localhost:11434"
"#;

const SAMPLE_BANK: &str = r#"[
  {
    "id": "risk-001",
    "domain": 1,
    "difficulty": "easy",
    "topic": "ALE calculations",
    "question": "An asset is worth $200,000, the exposure factor is 25% and the threat is expected once every two years. What is the annualized loss expectancy?",
    "options": ["$25,000", "$50,000", "$100,000", "$200,000"],
    "answer": 0,
    "explanation": "SLE is $200,000 x 0.25 = $50,000. ARO is 0.5, so ALE is $50,000 x 0.5 = $25,000."
  },
  {
    "id": "asset-001",
    "domain": 2,
    "difficulty": "medium",
    "topic": "data remanence",
    "question": "A company is donating old laptops with self-encrypting drives to a charity. What is the BEST way to ensure no data can be recovered?",
    "options": ["Reformat each drive", "Cryptographic erase", "Delete all user profiles", "Reinstall the operating system"],
    "answer": 1,
    "explanation": "Cryptographic erase destroys the media encryption key, leaving the stored data unreadable. Reformatting, deleting profiles and reinstalling leave recoverable remnants."
  },
  {
    "id": "arch-001",
    "domain": 3,
    "difficulty": "medium",
    "topic": "Bell-LaPadula",
    "question": "Which security model is MOST concerned with preventing users from reading data above their clearance?",
    "options": ["Biba", "Clark-Wilson", "Bell-LaPadula", "Brewer-Nash"],
    "answer": 2,
    "explanation": "Bell-LaPadula is a confidentiality model with the simple security property: no read up. Biba and Clark-Wilson address integrity, Brewer-Nash addresses conflicts of interest."
  },
  {
    "id": "net-001",
    "domain": 4,
    "difficulty": "hard",
    "topic": "IPSec",
    "question": "Two branch offices need a site-to-site VPN that hides the internal addressing of both networks. Which IPSec configuration BEST meets this need?",
    "options": ["AH in transport mode", "ESP in transport mode", "AH in tunnel mode", "ESP in tunnel mode"],
    "answer": 3,
    "explanation": "ESP in tunnel mode encrypts the entire original packet, including the inner headers. AH provides no confidentiality and transport mode leaves the original header exposed."
  },
  {
    "id": "iam-001",
    "domain": 5,
    "topic": "access control models",
    "question": "Access decisions in an organization are based on the user's job function. Which access control model is in use?",
    "options": ["Discretionary", "Role-based", "Mandatory", "Rule-based"],
    "answer": 1,
    "explanation": "Role-based access control grants permissions through roles mapped to job functions. The other models rely on owner discretion, labels or global rules."
  },
  {
    "id": "test-001",
    "domain": 6,
    "difficulty": "easy",
    "topic": "penetration testing",
    "question": "What should be obtained FIRST before a penetration test begins?",
    "options": ["Written authorization from management", "A list of known vulnerabilities", "Network diagrams", "Administrator credentials"],
    "answer": 0,
    "explanation": "Written authorization defines scope and makes the test legal. Everything else comes after management approval."
  },
  {
    "id": "ops-001",
    "domain": 7,
    "difficulty": "medium",
    "topic": "incident response",
    "question": "A security analyst confirms that malware is spreading across a file server. What should the analyst do FIRST?",
    "options": ["Restore the server from backup", "Contain the affected server", "Notify law enforcement", "Perform root cause analysis"],
    "answer": 1,
    "explanation": "Containment limits further damage and comes before eradication and recovery. Root cause analysis and external notification follow later in the process."
  },
  {
    "id": "dev-001",
    "domain": 8,
    "difficulty": "hard",
    "topic": "SQL injection",
    "question": "A legacy application builds SQL statements by concatenating user input. Which control MOST effectively prevents SQL injection?",
    "options": ["A web application firewall", "Input length limits", "Parameterized queries", "Encrypting the database"],
    "answer": 2,
    "explanation": "Parameterized queries separate code from data so input is never executed as SQL. A WAF and length limits can be bypassed, and encryption does not stop injection."
  }
]
"#;
