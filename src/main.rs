/// Command-line interface for the booking system.
///
/// An interactive menu for registering patients and providers, booking and
/// cancelling slots, viewing a provider's schedule and handling urgent cases.
use std::io::{self, BufRead, Write};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use slotbook::{BookingRequest, SchedulerConfig, SchedulingService};

struct BookingCLI<R> {
    service: SchedulingService,
    input: R,
    running: bool,
}

impl<R: BufRead> BookingCLI<R> {
    fn new(service: SchedulingService, input: R) -> Self {
        BookingCLI {
            service,
            input,
            running: true,
        }
    }

    fn print_header(&self) {
        println!("\n{}", "=".repeat(60));
        println!("       APPOINTMENT BOOKING SYSTEM");
        println!("{}", "=".repeat(60));
    }

    fn print_menu(&self) {
        println!("\n--- Main Menu ---");
        println!("1. Add patient");
        println!("2. Add provider");
        println!("3. Book appointment");
        println!("4. Cancel appointment");
        println!("5. Show provider schedule");
        println!("6. Process urgent case");
        println!("7. Exit");
        println!("{}", "-".repeat(20));
    }

    /// Prompt and read one trimmed line. `None` on end of input.
    fn get_input(&mut self, prompt: &str) -> io::Result<Option<String>> {
        print!("{}: ", prompt);
        io::stdout().flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn add_patient(&mut self) -> io::Result<()> {
        println!("\n--- Add Patient ---");
        let (Some(id), Some(name), Some(contact)) = (
            self.get_input("Patient ID")?,
            self.get_input("Name")?,
            self.get_input("Contact")?,
        ) else {
            return Ok(());
        };

        match self.service.register_patient(&id, &name, &contact) {
            Ok(patient) => println!("\nPatient {} registered with ID {}", patient.name, patient.patient_id),
            Err(e) => println!("\nError: {}", e),
        }
        Ok(())
    }

    fn add_provider(&mut self) -> io::Result<()> {
        println!("\n--- Add Provider ---");
        let (Some(id), Some(name), Some(specialty)) = (
            self.get_input("Provider ID")?,
            self.get_input("Name")?,
            self.get_input("Specialty")?,
        ) else {
            return Ok(());
        };

        match self.service.register_provider(&id, &name, &specialty) {
            Ok(provider) => println!(
                "\nProvider {} registered with ID {} ({} free slots)",
                provider.name,
                provider.provider_id,
                provider.calendar.free_count()
            ),
            Err(e) => println!("\nError: {}", e),
        }
        Ok(())
    }

    fn book(&mut self) -> io::Result<()> {
        println!("\n--- Book Appointment ---");
        let (Some(patient_id), Some(provider_id), Some(instant), Some(urgent)) = (
            self.get_input("Patient ID")?,
            self.get_input("Provider ID")?,
            self.get_input("Date and time (YYYY-MM-DD HH:MM)")?,
            self.get_input("Urgent? (y/n)")?,
        ) else {
            return Ok(());
        };
        let urgent = urgent.eq_ignore_ascii_case("y");

        match self
            .service
            .book(BookingRequest::new(patient_id, provider_id, instant, urgent))
        {
            Ok(apt) => {
                let patients = self.service.patients();
                let providers = self.service.providers();
                println!(
                    "\nAppointment booked for {} with {} at {}{}",
                    patients.name_of(&apt.patient_id).unwrap_or(&apt.patient_id),
                    providers.name_of(&apt.provider_id).unwrap_or(&apt.provider_id),
                    apt.instant,
                    if apt.urgent { " (urgent)" } else { "" }
                );
            }
            Err(e) => println!("\nError: {}", e),
        }
        Ok(())
    }

    fn cancel(&mut self) -> io::Result<()> {
        println!("\n--- Cancel Appointment ---");
        let (Some(patient_id), Some(provider_id), Some(instant)) = (
            self.get_input("Patient ID")?,
            self.get_input("Provider ID")?,
            self.get_input("Date and time (YYYY-MM-DD HH:MM)")?,
        ) else {
            return Ok(());
        };

        match self.service.cancel(&patient_id, &provider_id, &instant) {
            Ok(()) => println!("\nAppointment at {} cancelled; slot is free again", instant),
            Err(e) => println!("\nError: {}", e),
        }
        Ok(())
    }

    fn show_schedule(&mut self) -> io::Result<()> {
        let Some(provider_id) = self.get_input("Provider ID")? else {
            return Ok(());
        };

        let schedule = match self.service.provider_schedule(&provider_id) {
            Ok(schedule) => schedule,
            Err(e) => {
                println!("\nError: {}", e);
                return Ok(());
            }
        };

        println!("\nAvailable slots for {}:", schedule.provider_name);
        for slot in &schedule.free_slots {
            println!("  {}", slot);
        }

        println!("\nBooked appointments:");
        if schedule.appointments.is_empty() {
            println!("  (none)");
        }
        for apt in &schedule.appointments {
            println!(
                "  {} - {}{}",
                apt.instant,
                apt.patient_name,
                if apt.urgent { " (urgent)" } else { "" }
            );
        }
        Ok(())
    }

    fn process_urgent(&mut self) {
        println!("\n--- Processing Urgent Cases ---");
        match self.service.process_next_urgent() {
            Some(case) => println!(
                "Urgent case: {} with {} at {} ({} still pending)",
                case.patient_name,
                case.provider_name,
                case.entry.instant,
                self.service.pending_urgent()
            ),
            None => println!("No urgent cases pending"),
        }
    }

    fn run(&mut self) -> io::Result<()> {
        self.print_header();

        while self.running {
            self.print_menu();

            let Some(choice) = self.get_input("Enter choice")? else {
                break;
            };

            match choice.as_str() {
                "1" => self.add_patient()?,
                "2" => self.add_provider()?,
                "3" => self.book()?,
                "4" => self.cancel()?,
                "5" => self.show_schedule()?,
                "6" => self.process_urgent(),
                "7" => {
                    self.running = false;
                    println!("\nGoodbye!");
                }
                _ => println!("Invalid choice"),
            }
        }
        Ok(())
    }
}

fn seed(service: &mut SchedulingService) -> Result<(), Box<dyn std::error::Error>> {
    service.register_patient("P001", "Juan Perez", "juan@example.com")?;
    service.register_provider("D001", "Dra. Garcia", "Cardiology")?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("slotbook=info".parse()?))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = SchedulerConfig::from_env();
    tracing::info!(
        "Calendars cover {} {:02}:00-{:02}:00 every {} minutes",
        config.reference_day,
        config.start_hour,
        config.end_hour,
        config.slot_minutes
    );

    let mut service = SchedulingService::new(config);
    seed(&mut service)?;

    let stdin = io::stdin();
    let mut cli = BookingCLI::new(service, stdin.lock());
    cli.run()?;
    Ok(())
}
